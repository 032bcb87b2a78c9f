/// Configuration options for the matcher.
///
/// Each nested rule call costs native stack. The defaults keep a parse
/// within the 2 MiB stack of a spawned thread in debug builds; raise both
/// limits together when parsing on a thread with a larger stack.
///
/// # Example
///
/// ```rust
/// use rulecraft::parser::MatchConfig;
///
/// // Use default configuration
/// let config = MatchConfig::default();
///
/// // Or customize it
/// let config = MatchConfig {
///     max_depth: 128,
///     max_stack: 1024 * 1024,
///     detect_left_recursion: true,
///     memoize_failures: false,
///     max_memo_size: 4096,
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchConfig {
    /// Maximum number of nested rule calls before the parse is aborted with
    /// [`ParseError::StackExhausted`](crate::error::ParseError::StackExhausted)
    pub max_depth: usize,

    /// Bytes of native stack a parse may grow by before it is aborted with
    /// [`ParseError::StackExhausted`](crate::error::ParseError::StackExhausted),
    /// measured from where the parse started. `usize::MAX` disables the check.
    pub max_stack: usize,

    /// Abort with [`ParseError::LeftRecursion`](crate::error::ParseError::LeftRecursion)
    /// when a rule is re-entered at the position it is already active at
    pub detect_left_recursion: bool,

    /// Remember (rule, position) pairs that failed so they are not retried
    pub memoize_failures: bool,

    /// Maximum number of remembered failures before the cache is cleared
    pub max_memo_size: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            max_depth: 256,
            max_stack: 1536 * 1024,
            detect_left_recursion: true,
            memoize_failures: true,
            max_memo_size: 4096,
        }
    }
}
