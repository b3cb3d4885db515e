//! # pdfium-locate
//!
//! Find a [PDFium](https://pdfium.googlesource.com/pdfium/) shared library on
//! the local machine and bind `pdfium-render` to it, without asking users to
//! set `DYLD_LIBRARY_PATH` / `LD_LIBRARY_PATH`.
//!
//! Nothing is downloaded. [`bind_pdfium`] tries each candidate from
//! [`search_paths`] in order and falls back to the system library search.
//!
//! ## Search order
//!
//! 1. An explicit path: the library file itself, or a directory containing it.
//! 2. `PDFIUM_LIB_PATH` (file or directory, same rules).
//! 3. The directory of the running executable, then its `lib/` subdirectory.
//! 4. The current working directory.
//! 5. The per-user data directory: `{data_local_dir}/pdf2jpg/`.
//! 6. The system library search path.
//!
//! ## Usage
//!
//! ```rust,no_run
//! let pdfium = pdfium_locate::bind_pdfium(None).expect("PDFium unavailable");
//! ```
//!
//! ## Platform library names
//!
//! | OS      | Library            |
//! |---------|--------------------|
//! | macOS   | `libpdfium.dylib`  |
//! | Linux   | `libpdfium.so`     |
//! | Windows | `pdfium.dll`       |

use std::path::{Path, PathBuf};

use pdfium_render::prelude::Pdfium;
use thiserror::Error;

/// Environment variable naming a pdfium library file or its directory.
pub const LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Subdirectory of the per-user data directory that is searched.
pub const DATA_DIR_NAME: &str = "pdf2jpg";

// ── Error type ───────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum PdfiumLocateError {
    /// An explicitly requested library does not exist.
    #[error("PDFium library not found at '{0}'")]
    NotFound(PathBuf),

    /// `pdfium-render` could not load the library at this path.
    #[error("Failed to bind PDFium from '{path}': {reason}")]
    Bind { path: PathBuf, reason: String },

    /// No candidate worked and the system library could not be loaded either.
    #[error(
        "No usable PDFium library found (searched {searched} location(s), then the system path: {reason}). \
         Set {env} or pass the library path explicitly."
    )]
    Unavailable {
        searched: usize,
        reason: String,
        env: &'static str,
    },
}

// ── Paths ────────────────────────────────────────────────────────────────────

/// File name of the pdfium shared library on this platform.
pub fn platform_library_name() -> &'static str {
    if cfg!(target_os = "macos") {
        "libpdfium.dylib"
    } else if cfg!(target_os = "windows") {
        "pdfium.dll"
    } else {
        "libpdfium.so"
    }
}

/// Candidate library paths in search order. Candidates may not exist.
pub fn search_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
    let env_path = std::env::var_os(LIB_PATH_ENV).map(PathBuf::from);
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    let cwd = std::env::current_dir().ok();
    let data_dir = dirs::data_local_dir().map(|d| d.join(DATA_DIR_NAME));

    candidates(
        explicit,
        env_path.as_deref(),
        exe_dir.as_deref(),
        cwd.as_deref(),
        data_dir.as_deref(),
    )
}

fn candidates(
    explicit: Option<&Path>,
    env_path: Option<&Path>,
    exe_dir: Option<&Path>,
    cwd: Option<&Path>,
    data_dir: Option<&Path>,
) -> Vec<PathBuf> {
    let lib = platform_library_name();
    let mut out: Vec<PathBuf> = Vec::new();

    let mut push = |p: PathBuf| {
        if !out.contains(&p) {
            out.push(p);
        }
    };

    for p in [explicit, env_path].into_iter().flatten() {
        push(as_library_path(p));
    }
    if let Some(dir) = exe_dir {
        push(dir.join(lib));
        push(dir.join("lib").join(lib));
    }
    if let Some(dir) = cwd {
        push(dir.join(lib));
    }
    if let Some(dir) = data_dir {
        push(dir.join(lib));
    }
    out
}

/// A directory means "the platform library inside it"; anything else is
/// taken as the library file.
fn as_library_path(p: &Path) -> PathBuf {
    if p.is_dir() {
        p.join(platform_library_name())
    } else {
        p.to_path_buf()
    }
}

/// First existing candidate, if any.
pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
    search_paths(explicit).into_iter().find(|p| p.is_file())
}

// ── Binding ──────────────────────────────────────────────────────────────────

/// Bind to a library at exactly this path.
pub fn bind_pdfium_from_path(path: &Path) -> Result<Pdfium, PdfiumLocateError> {
    Pdfium::bind_to_library(path)
        .map(Pdfium::new)
        .map_err(|e| PdfiumLocateError::Bind {
            path: path.to_path_buf(),
            reason: format!("{:?}", e),
        })
}

/// Search for a pdfium library and bind to the first one that loads.
///
/// An `explicit` path that does not exist is an error rather than a silent
/// fallback.
pub fn bind_pdfium(explicit: Option<&Path>) -> Result<Pdfium, PdfiumLocateError> {
    if let Some(p) = explicit {
        let path = as_library_path(p);
        if !path.is_file() {
            return Err(PdfiumLocateError::NotFound(path));
        }
        return bind_pdfium_from_path(&path);
    }

    let paths = search_paths(None);
    let mut last_reason = None;
    for path in paths.iter().filter(|p| p.is_file()) {
        match bind_pdfium_from_path(path) {
            Ok(pdfium) => return Ok(pdfium),
            Err(e) => {
                eprintln!("pdfium-locate: skipping {}", e);
                last_reason = Some(e.to_string());
            }
        }
    }

    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|e| PdfiumLocateError::Unavailable {
            searched: paths.len(),
            reason: last_reason.unwrap_or_else(|| format!("{:?}", e)),
            env: LIB_PATH_ENV,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_name_matches_platform() {
        let name = platform_library_name();
        assert!(name.contains("pdfium"));
        #[cfg(target_os = "linux")]
        assert_eq!(name, "libpdfium.so");
    }

    #[test]
    fn candidates_follow_search_order() {
        let lib = platform_library_name();
        let paths = candidates(
            Some(Path::new("/opt/custom/libpdfium-test.so")),
            Some(Path::new("/env/libpdfium-env.so")),
            Some(Path::new("/app/bin")),
            Some(Path::new("/work")),
            Some(Path::new("/home/u/.local/share/pdf2jpg")),
        );
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/opt/custom/libpdfium-test.so"),
                PathBuf::from("/env/libpdfium-env.so"),
                Path::new("/app/bin").join(lib),
                Path::new("/app/bin/lib").join(lib),
                Path::new("/work").join(lib),
                Path::new("/home/u/.local/share/pdf2jpg").join(lib),
            ]
        );
    }

    #[test]
    fn directories_resolve_to_the_library_inside() {
        let dir = std::env::temp_dir();
        let paths = candidates(Some(&dir), None, None, None, None);
        assert_eq!(paths, vec![dir.join(platform_library_name())]);
    }

    #[test]
    fn duplicate_locations_are_searched_once() {
        let paths = candidates(
            None,
            None,
            Some(Path::new("/same")),
            Some(Path::new("/same")),
            None,
        );
        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn locate_prefers_an_existing_explicit_file() {
        let dir = std::env::temp_dir().join(format!("pdfium-locate-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let lib = dir.join(platform_library_name());
        std::fs::write(&lib, b"not really a library").unwrap();

        assert_eq!(locate(Some(&dir)), Some(lib.clone()));
        assert_eq!(locate(Some(&lib)), Some(lib.clone()));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_explicit_library_is_an_error() {
        let err = match bind_pdfium(Some(Path::new("/definitely/not/libpdfium.so"))) {
            Err(e) => e,
            Ok(_) => panic!("binding a missing file must fail"),
        };
        assert!(matches!(err, PdfiumLocateError::NotFound(_)));
    }
}
