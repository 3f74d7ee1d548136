use ignore::WalkBuilder;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

const VHDL_EXTENSIONS: [&str; 2] = ["vhd", "vhdl"];

pub fn is_vhdl_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| VHDL_EXTENSIONS.iter().any(|v| ext.eq_ignore_ascii_case(v)))
}

/// Returns `path` itself when it is a file, otherwise every VHDL file below
/// it that is not excluded by ignore files, sorted.
pub fn collect_vhdl_files(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        return vec![path.to_path_buf()];
    }

    let mut files = Vec::new();

    let walker = WalkBuilder::new(path)
        .hidden(false)
        .git_ignore(true)
        .git_global(false)
        .git_exclude(false)
        .require_git(false)
        .build();

    for entry in walker.flatten() {
        let path = entry.path();
        if path.is_file() && is_vhdl_file(path) {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    files
}

pub fn read_paths_from_stdin() -> Vec<PathBuf> {
    let stdin = io::stdin();
    stdin
        .lock()
        .lines()
        .map_while(Result::ok)
        .filter(|line| !line.trim().is_empty())
        .map(|line| PathBuf::from(line.trim()))
        .collect()
}
