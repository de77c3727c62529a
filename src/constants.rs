//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Repository walk constants
pub mod scan {
    /// Maximum file size a detector will read (1MB)
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 1_048_576;

    /// Dependency/build directory names skipped during the walk
    pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
        "node_modules",
        "vendor",
        "dist",
        "build",
        ".next",
        ".nuxt",
        ".svelte-kit",
        ".expo",
        ".git",
        "target",
        "coverage",
        "__pycache__",
        ".venv",
        "out",
        "Pods",
    ];
}

/// Pattern detector constants
pub mod detect {
    /// Number of candidate UI files the event detector samples
    pub const EVENT_SAMPLE_LIMIT: usize = 50;

    /// Characters after a `fetch(` call searched for a `method:` option
    pub const FETCH_OPTIONS_WINDOW: usize = 200;
}

/// Evidence collection and chunking constants
pub mod evidence {
    /// Default token budget for a chunking call
    pub const DEFAULT_TOKEN_BUDGET: usize = 8_000;

    /// Fixed characters-per-token estimation ratio
    pub const DEFAULT_CHARS_PER_TOKEN: usize = 4;

    /// Below this many remaining tokens the boundary document is dropped, not truncated
    pub const DEFAULT_MIN_USEFUL_TOKENS: usize = 50;

    /// Maximum files collected from docs/ directories
    pub const DEFAULT_MAX_DOCS_FILES: usize = 20;

    /// Content cap per collected document (characters)
    pub const DEFAULT_MAX_DOCUMENT_CHARS: usize = 100_000;

    /// Default priority table, highest first
    pub mod priority {
        pub const UPLOADED_BRIEF: u32 = 100;
        pub const REPO_README: u32 = 90;
        pub const DOCS_FILE: u32 = 70;
        pub const PACKAGE_METADATA: u32 = 50;
        pub const CODE_SUMMARY: u32 = 40;
        pub const CONFIG_FILE: u32 = 20;
        pub const TEST_FILE: u32 = 10;
    }
}
