//! Standard exit codes for the lunahack binary
//!
//! Each failure class gets its own code so wrapper scripts can tell
//! "nothing to do" apart from a genuine pipeline failure.

/// Successful execution
pub const EXIT_SUCCESS: i32 = 0;

/// Generic error (avoid using - be more specific)
pub const EXIT_ERROR: i32 = 1;

/// Panic or unrecoverable error
pub const EXIT_PANIC: i32 = 101;

/// No candidate images were found in the working directory
pub const EXIT_NO_IMAGES: i32 = 102;

/// User quit at an interactive prompt
pub const EXIT_ABORTED: i32 = 103;

/// External tool failed under the strict failure policy
pub const EXIT_TOOL_ERROR: i32 = 104;

/// I/O error (file not found, permission denied, disk error)
pub const EXIT_IO_ERROR: i32 = 105;

/// Interactive prompt could not be displayed or read
pub const EXIT_PROMPT_ERROR: i32 = 106;
