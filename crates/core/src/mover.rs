//! Executes a move plan without ever overwriting an existing file.

use crate::error::{MoveError, MoveStage};
use crate::models::{MoveOutcome, MovePlanEntry, MoveResult};
use std::collections::HashSet;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

/// Upper bound on `name (n).ext` candidates tried for one file.
const MAX_DISAMBIGUATOR: u32 = 10_000;

#[derive(Debug, Clone, Copy)]
pub struct SafeMover {
    /// Compare digests of source and copy before deleting the source when a
    /// plain rename isn't possible.
    pub verify_copy: bool,
}

impl Default for SafeMover {
    fn default() -> Self {
        Self { verify_copy: true }
    }
}

impl SafeMover {
    pub fn new(verify_copy: bool) -> Self {
        Self { verify_copy }
    }

    /// Results come back in plan order, one per entry.
    pub fn execute(&self, plan: &[MovePlanEntry], root: &Path) -> Vec<MoveResult> {
        self.execute_with(plan, root, None, |_| {})
    }

    /// Like [`execute`](Self::execute), calling `on_result` after each entry.
    /// `cancel` is only looked at between files; once set, the remaining
    /// entries are reported as skipped.
    pub fn execute_with(
        &self,
        plan: &[MovePlanEntry],
        root: &Path,
        cancel: Option<&AtomicBool>,
        mut on_result: impl FnMut(&MoveResult),
    ) -> Vec<MoveResult> {
        let mut results = Vec::with_capacity(plan.len());
        for entry in plan {
            let outcome = if cancel.map(|c| c.load(Ordering::SeqCst)).unwrap_or(false) {
                MoveOutcome::Skipped {
                    reason: "cancelled".to_string(),
                }
            } else {
                self.move_entry(entry, root)
            };
            let result = MoveResult {
                entry: entry.clone(),
                outcome,
            };
            on_result(&result);
            results.push(result);
        }
        results
    }

    /// Destinations `execute` would use right now, without touching the
    /// disk. Names claimed by earlier entries count as taken.
    pub fn preview(&self, plan: &[MovePlanEntry], root: &Path) -> Vec<MoveResult> {
        let mut claimed = HashSet::new();
        let mut results = Vec::with_capacity(plan.len());
        for entry in plan {
            let outcome = match pick_target(&entry.destination(root), &claimed) {
                Ok(target) => {
                    claimed.insert(target.clone());
                    MoveOutcome::Planned {
                        destination: target,
                    }
                }
                Err(e) => failed(&entry.record.path, MoveStage::Collision, e),
            };
            results.push(MoveResult {
                entry: entry.clone(),
                outcome,
            });
        }
        results
    }

    /// Where `entry` would land if it were moved now.
    pub fn target_for(&self, entry: &MovePlanEntry, root: &Path) -> io::Result<PathBuf> {
        pick_target(&entry.destination(root), &HashSet::new())
    }

    pub fn move_entry(&self, entry: &MovePlanEntry, root: &Path) -> MoveOutcome {
        let source = &entry.record.path;
        let dest_dir = entry.destination_dir(root);
        if let Err(e) = fs::create_dir_all(&dest_dir) {
            return failed(source, MoveStage::CreateDir, e);
        }

        let wanted = dest_dir.join(entry.record.file_name());
        let target = match pick_target(&wanted, &HashSet::new()) {
            Ok(t) => t,
            Err(e) => return failed(source, MoveStage::Collision, e),
        };
        let renamed = target != wanted;

        match fs::rename(source, &target) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
                debug!("{:?} is on another device, copying", source);
                if let Err(err) = self.copy_then_delete(source, &target) {
                    return MoveOutcome::Failed { error: err };
                }
            }
            Err(e) => return failed(source, MoveStage::Rename, e),
        }

        if renamed {
            MoveOutcome::Renamed {
                destination: target,
            }
        } else {
            MoveOutcome::Moved {
                destination: target,
            }
        }
    }

    fn copy_then_delete(&self, source: &Path, target: &Path) -> Result<(), MoveError> {
        let copy_err = |e: io::Error| MoveError::new(source, MoveStage::Copy, e);
        let reader = fs::File::open(source).map_err(copy_err)?;
        let writer = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(target)
            .map_err(copy_err)?;
        // Any failure past this point removes the target again.
        if let Err(err) = self.fill_target(reader, writer, source, target) {
            let _ = fs::remove_file(target);
            return Err(err);
        }

        fs::remove_file(source).map_err(|e| {
            warn!("copied {:?} but could not remove the source: {}", source, e);
            MoveError::new(source, MoveStage::Rename, format!("source left in place: {e}"))
        })
    }

    fn fill_target(
        &self,
        mut reader: fs::File,
        mut writer: fs::File,
        source: &Path,
        target: &Path,
    ) -> Result<(), MoveError> {
        let copy_err = |e: io::Error| MoveError::new(source, MoveStage::Copy, e);
        io::copy(&mut reader, &mut writer).map_err(copy_err)?;
        if let Ok(mtime) = reader.metadata().and_then(|m| m.modified()) {
            let _ = writer.set_modified(mtime);
        }
        writer.sync_all().map_err(copy_err)?;
        drop(writer);

        if self.verify_copy {
            let same = digest(source)
                .and_then(|a| digest(target).map(|b| a == b))
                .map_err(|e| MoveError::new(source, MoveStage::Verify, e))?;
            if !same {
                return Err(MoveError::new(
                    source,
                    MoveStage::Verify,
                    "copy does not match source",
                ));
            }
        }
        Ok(())
    }
}

fn failed(source: &Path, stage: MoveStage, err: impl std::fmt::Display) -> MoveOutcome {
    warn!("move failed for {:?} ({:?}): {}", source, stage, err);
    MoveOutcome::Failed {
        error: MoveError::new(source, stage, err),
    }
}

fn occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

fn pick_target(wanted: &Path, claimed: &HashSet<PathBuf>) -> io::Result<PathBuf> {
    let taken = |p: &Path| occupied(p) || claimed.contains(p);
    if !taken(wanted) {
        return Ok(wanted.to_path_buf());
    }
    free_name(wanted, taken)
}

/// First free `name (n).ext` next to `dest`, counting from 1.
pub fn resolve_collision(dest: &Path) -> io::Result<PathBuf> {
    free_name(dest, occupied)
}

fn free_name(dest: &Path, taken: impl Fn(&Path) -> bool) -> io::Result<PathBuf> {
    let parent = dest.parent().unwrap_or_else(|| Path::new("."));
    let stem = dest
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string());
    let ext = dest
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();

    for counter in 1..=MAX_DISAMBIGUATOR {
        let name = if ext.is_empty() {
            format!("{} ({})", stem, counter)
        } else {
            format!("{} ({}).{}", stem, counter, ext)
        };
        let candidate = parent.join(name);
        if !taken(&candidate) {
            return Ok(candidate);
        }
    }
    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("no free name for {:?}", dest),
    ))
}

fn digest(path: &Path) -> io::Result<blake3::Hash> {
    let mut file = fs::File::open(path)?;
    let mut hasher = blake3::Hasher::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize())
}
