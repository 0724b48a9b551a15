//! FILENAME: src/caller.rs
// PURPOSE: Caller resolution for log attribution.
// CONTEXT: Walks the execution stack to find the first application-source
//          frame, remapping build-output paths back to the source tree.

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

use backtrace::Backtrace;
use once_cell::sync::Lazy;
use serde::Serialize;

// ============================================================================
// TYPES
// ============================================================================

/// Source location of the frame that triggered a logging call.
/// Valid only for the duration of that call; `file` is project-root-relative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallerInfo {
    pub file: String,
    pub line: u32,
}

/// Structured metadata extracted from one stack frame.
#[derive(Debug, Clone)]
pub struct FrameInfo {
    pub file: Option<PathBuf>,
    pub line: Option<u32>,
    pub symbol: Option<String>,
}

/// Stack-trace formatting hook of the error-reporting facility.
/// The resolver temporarily swaps this for its own hook while it scans.
pub type PrepareHook = fn(&[FrameInfo]) -> String;

thread_local! {
    static PREPARE_HOOK: Cell<PrepareHook> = Cell::new(default_prepare);
    static RESOLVED: RefCell<Option<CallerInfo>> = RefCell::new(None);
}

/// Project root used to relativize accepted frame paths.
static PROJECT_ROOT: Lazy<PathBuf> = Lazy::new(|| {
    if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
        return PathBuf::from(manifest_dir);
    }
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
});

pub(crate) fn project_root() -> &'static Path {
    &PROJECT_ROOT
}

// ============================================================================
// STACK CAPTURE & FORMATTING HOOK
// ============================================================================

/// Capture the current stack as structured frame metadata.
/// Frames without debug info simply carry `None` fields.
pub fn capture_frames() -> Vec<FrameInfo> {
    let trace = Backtrace::new();
    let mut frames = Vec::new();
    for frame in trace.frames() {
        for symbol in frame.symbols() {
            frames.push(FrameInfo {
                file: symbol.filename().map(Path::to_path_buf),
                line: symbol.lineno(),
                symbol: symbol.name().map(|name| name.to_string()),
            });
        }
    }
    frames
}

/// Render the current stack through the installed formatting hook.
pub fn render_stack() -> String {
    let frames = capture_frames();
    let hook = PREPARE_HOOK.with(|slot| slot.get());
    hook(&frames)
}

/// The hook currently installed for this thread.
pub fn prepare_hook() -> PrepareHook {
    PREPARE_HOOK.with(|slot| slot.get())
}

fn default_prepare(frames: &[FrameInfo]) -> String {
    let mut lines = Vec::with_capacity(frames.len());
    for frame in frames {
        let symbol = frame.symbol.as_deref().unwrap_or("<unknown>");
        match (&frame.file, frame.line) {
            (Some(file), Some(line)) => {
                lines.push(format!("  at {} ({}:{})", symbol, file.display(), line));
            }
            _ => lines.push(format!("  at {}", symbol)),
        }
    }
    lines.join("\n")
}

/// Restores the previous hook on every exit path, including unwinding.
struct HookGuard {
    saved: PrepareHook,
}

impl HookGuard {
    fn install(hook: PrepareHook) -> Self {
        let saved = PREPARE_HOOK.with(|slot| slot.replace(hook));
        HookGuard { saved }
    }
}

impl Drop for HookGuard {
    fn drop(&mut self) {
        let saved = self.saved;
        PREPARE_HOOK.with(|slot| slot.set(saved));
    }
}

// ============================================================================
// CALLER RESOLUTION
// ============================================================================

/// Resolve the first application-source frame above the logging facility.
/// Returns `None` when no qualifying frame exists (runtime-internal or
/// dependency frames only, or frame metadata unavailable).
pub fn caller_info() -> Option<CallerInfo> {
    RESOLVED.with(|slot| slot.borrow_mut().take());
    let _guard = HookGuard::install(resolving_prepare);
    let _ = render_stack();
    RESOLVED.with(|slot| slot.borrow_mut().take())
}

/// Replacement hook: scans the frames for a qualifying caller, stashes the
/// first hit, then falls through to the default rendering so any error
/// report produced mid-resolution looks normal.
fn resolving_prepare(frames: &[FrameInfo]) -> String {
    let root = project_root();
    for frame in frames {
        if let Some(info) = resolve_frame(root, frame) {
            RESOLVED.with(|slot| *slot.borrow_mut() = Some(info));
            break;
        }
    }
    default_prepare(frames)
}

/// Apply the acceptance rules to a single frame.
/// Any conversion failure is a per-frame miss, never an error.
pub(crate) fn resolve_frame(root: &Path, frame: &FrameInfo) -> Option<CallerInfo> {
    let file = frame.file.as_ref()?;
    let line = frame.line?;

    let normalized = normalize(file);
    if is_runtime_internal(&normalized) || is_dependency(&normalized) {
        return None;
    }

    // Frames reported from build output get remapped to the source tree.
    let path = if has_target_component(&normalized) {
        remap_build_output(root, &normalized, frame.symbol.as_deref())?
    } else {
        file.clone()
    };

    let rel = root_relative(root, &path)?;
    if !rel.starts_with("src/") || is_facility(&rel) {
        return None;
    }

    Some(CallerInfo { file: rel, line })
}

fn normalize(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn is_runtime_internal(path: &str) -> bool {
    path.starts_with("/rustc/")
        || path.contains("/library/std/")
        || path.contains("/library/core/")
        || path.contains("/library/alloc/")
}

fn is_dependency(path: &str) -> bool {
    path.contains("/.cargo/registry/")
        || path.contains("/.cargo/git/")
        || path.contains("/registry/src/")
}

/// The facility must never attribute a line to itself.
fn is_facility(path: &str) -> bool {
    path.ends_with("src/caller.rs") || path.ends_with("src/logger.rs")
}

fn has_target_component(path: &str) -> bool {
    path.split('/').any(|segment| segment == "target")
}

/// Remap a build-output path back into the source tree.
/// Prefers module inference from the frame symbol; falls back to a textual
/// substitution of the generated-output prefix. Returns `None` when the
/// remap would land outside `src/`.
pub(crate) fn remap_build_output(
    root: &Path,
    normalized: &str,
    symbol: Option<&str>,
) -> Option<PathBuf> {
    if let Some(symbol) = symbol {
        if symbol.contains("::") {
            if let Some(inferred) = infer_source_from_symbol(root, symbol) {
                return Some(inferred);
            }
        }
    }

    // Generated files live under ".../out/"; everything after that mirrors
    // the source layout.
    let tail = normalized.split("/out/").nth(1)?;
    let mut candidate = root.join("src").join(tail);
    candidate.set_extension("rs");
    Some(candidate)
}

/// Infer `src/<module path>.rs` from a module-qualified symbol such as
/// `app_lib::ipc::handlers::test::ping::h0123abcd`.
pub(crate) fn infer_source_from_symbol(root: &Path, symbol: &str) -> Option<PathBuf> {
    let segments: Vec<&str> = symbol
        .split("::")
        .filter(|segment| *segment != "{{closure}}" && !is_symbol_hash(segment))
        .collect();

    // Need at least crate, one module, and the item itself.
    if segments.len() < 3 {
        return None;
    }
    let modules = &segments[1..segments.len() - 1];

    let mut path = root.join("src");
    for module in modules {
        path.push(module);
    }
    path.set_extension("rs");
    Some(path)
}

fn is_symbol_hash(segment: &str) -> bool {
    segment.len() == 17
        && segment.starts_with('h')
        && segment[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Convert to a project-root-relative path; paths escaping the root are
/// rejected so the scan can continue with the next frame.
fn root_relative(root: &Path, path: &Path) -> Option<String> {
    let rel = if path.is_absolute() {
        path.strip_prefix(root).ok()?
    } else {
        path
    };
    let rel = normalize(rel);
    if rel.starts_with("..") {
        return None;
    }
    Some(rel)
}
