use std::path::PathBuf;

/// Directory holding the running executable. Default config and database
/// files live next to the program so a library copy carries its own state.
pub fn program_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let exe = exe.canonicalize().unwrap_or(exe);
    exe.parent().map(|p| p.to_path_buf())
}

/// Platform data directory (~/.local/share/reeltrack or equivalent).
/// Only used when the program directory cannot be resolved.
pub fn data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "reeltrack").map(|dirs| dirs.data_dir().to_path_buf())
}

/// Where default state files live: the program directory, falling back to
/// the data directory, falling back to the working directory.
pub fn state_dir() -> PathBuf {
    program_dir()
        .or_else(data_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}
