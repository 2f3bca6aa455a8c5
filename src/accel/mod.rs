//! Accelerator overrides.
//!
//! [`AccelRegistry`] remembers, for every accelerator path it has touched,
//! the binding it set and the binding the host had before the first change.
//! The host's accelerator table itself sits behind [`BindingBackend`].

pub mod format;
pub mod map;

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::keybindings::UNSET;

pub use map::AccelMap;

/// Host-side accelerator table.
pub trait BindingBackend {
    /// Current binding for `path`: `None` when the host does not know the
    /// path, `Some("")` when it knows it but no accelerator is set.
    fn lookup(&self, path: &str) -> Option<String>;

    /// Replace the binding for `path`. `false` when the host rejects it.
    fn rewrite(&mut self, path: &str, binding: &str) -> bool;
}

/// One tracked accelerator path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccelBinding {
    pub path: String,
    pub current: String,
    /// Binding observed before the first change. Never updated afterwards.
    pub default: String,
}

/// Paths whose accelerators have been changed, keyed by path.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AccelRegistry {
    entries: BTreeMap<String, AccelBinding>,
}

impl AccelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&AccelBinding> {
        self.entries.get(path)
    }

    /// Entries in path order.
    pub fn iter(&self) -> impl Iterator<Item = &AccelBinding> {
        self.entries.values()
    }

    /// Rebind `path` to `binding` (`UNSET` removes the accelerator).
    ///
    /// The first change of a path records the host's binding at that moment
    /// as the default. A rejected change leaves the registry as it was; an
    /// untracked path stays untracked.
    pub fn change<B: BindingBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        path: &str,
        binding: &str,
    ) -> bool {
        let observed = if self.entries.contains_key(path) {
            None
        } else {
            Some(backend.lookup(path).unwrap_or_else(|| UNSET.to_string()))
        };

        if !backend.rewrite(path, binding) {
            warn!(path, binding, "accelerator change rejected");
            return false;
        }

        match observed {
            Some(default) => {
                debug!(path, from = %default, to = binding, "accelerator changed");
                self.entries.insert(
                    path.to_string(),
                    AccelBinding {
                        path: path.to_string(),
                        current: binding.to_string(),
                        default,
                    },
                );
            }
            None => {
                if let Some(entry) = self.entries.get_mut(path) {
                    debug!(path, from = %entry.current, to = binding, "accelerator changed");
                    entry.current = binding.to_string();
                }
            }
        }
        true
    }

    /// Restore every tracked path to its default, then forget them all.
    pub fn revert_all<B: BindingBackend + ?Sized>(&mut self, backend: &mut B) {
        for entry in self.entries.values() {
            if !backend.rewrite(&entry.path, &entry.default) {
                warn!(path = %entry.path, default = %entry.default, "failed to restore accelerator");
            }
        }
        info!(count = self.entries.len(), "accelerators reverted to defaults");
        self.entries.clear();
    }

    /// Replace the registry with the records read from `reader` and apply
    /// each record's current binding to the host.
    ///
    /// The whole input is parsed first: on a malformed record nothing is
    /// applied and the registry is left as it was.
    pub fn load<B, R>(&mut self, backend: &mut B, reader: R) -> Result<()>
    where
        B: BindingBackend + ?Sized,
        R: BufRead,
    {
        let records = format::read_records(reader)?;

        self.entries.clear();
        for record in records {
            if !backend.rewrite(&record.path, &record.current) {
                warn!(path = %record.path, binding = %record.current, "saved accelerator rejected by host");
            }
            self.entries.insert(record.path.clone(), record);
        }
        debug!(count = self.entries.len(), "accelerators loaded");
        Ok(())
    }

    /// Write every entry as a `path current default` record.
    pub fn save<W: Write>(&self, writer: W) -> io::Result<()> {
        format::write_records(writer, self.entries.values())
    }

    /// [`load`](Self::load) from a file. A missing file is an `Io` error
    /// with `NotFound`; callers decide whether that matters.
    pub fn load_file<B: BindingBackend + ?Sized>(&mut self, backend: &mut B, path: &Path) -> Result<()> {
        let file = File::open(path)?;
        self.load(backend, BufReader::new(file))?;
        info!(file = %path.display(), count = self.len(), "loaded accelerator overrides");
        Ok(())
    }

    /// [`save`](Self::save) to a file using atomic write pattern.
    pub fn save_file(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }

        let mut temp_name = path.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = Path::new(&temp_name);

        let mut buf = Vec::new();
        self.save(&mut buf)?;
        if let Err(e) = fs::write(temp_path, &buf).and_then(|()| fs::rename(temp_path, path)) {
            let _ = fs::remove_file(temp_path);
            warn!(file = %path.display(), error = %e, "failed to save accelerator overrides");
            return Err(e.into());
        }

        info!(file = %path.display(), count = self.len(), "saved accelerator overrides");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NemoError;

    const EXTRA_PANE: &str = "<Actions>/ShellActions/Show Hide Extra Pane";
    const OPEN: &str = "<Actions>/DirViewActions/Open";
    const COPY: &str = "<Actions>/DirViewActions/Copy to next pane";

    fn host() -> AccelMap {
        let mut map = AccelMap::new();
        map.add_entry(EXTRA_PANE, "F3");
        map.add_entry(OPEN, "<Control>o");
        map.add_entry(COPY, "");
        map
    }

    #[test]
    fn test_change_records_default_once() {
        let mut host = host();
        let mut reg = AccelRegistry::new();

        assert!(reg.change(&mut host, OPEN, "q"));
        assert!(reg.change(&mut host, OPEN, "z"));

        let entry = reg.get(OPEN).unwrap();
        assert_eq!(entry.default, "<Control>o");
        assert_eq!(entry.current, "z");
        assert_eq!(host.lookup(OPEN).as_deref(), Some("z"));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_change_unset_default() {
        let mut host = host();
        let mut reg = AccelRegistry::new();

        assert!(reg.change(&mut host, COPY, "F5"));
        assert_eq!(reg.get(COPY).unwrap().default, UNSET);
        assert_eq!(reg.get(COPY).unwrap().current, "F5");
    }

    #[test]
    fn test_change_to_unset() {
        let mut host = host();
        let mut reg = AccelRegistry::new();

        assert!(reg.change(&mut host, EXTRA_PANE, UNSET));
        assert_eq!(host.lookup(EXTRA_PANE).as_deref(), Some(""));
        assert_eq!(reg.get(EXTRA_PANE).unwrap().default, "F3");
    }

    #[test]
    fn test_failed_change_keeps_current() {
        let mut host = host();
        let mut reg = AccelRegistry::new();

        assert!(reg.change(&mut host, OPEN, "F9"));
        host.lock_path(OPEN);
        assert!(!reg.change(&mut host, OPEN, "F10"));

        let entry = reg.get(OPEN).unwrap();
        assert_eq!(entry.current, "F9");
        assert_eq!(entry.default, "<Control>o");
        assert_eq!(host.lookup(OPEN).as_deref(), Some("F9"));
    }

    #[test]
    fn test_failed_first_change_tracks_nothing() {
        let mut host = host();
        let mut reg = AccelRegistry::new();

        assert!(!reg.change(&mut host, "<Actions>/Nowhere/Nothing", "F2"));
        assert!(reg.get("<Actions>/Nowhere/Nothing").is_none());
        assert!(reg.is_empty());

        let mut buf = Vec::new();
        reg.save(&mut buf).unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn test_failed_first_change_on_locked_path_tracks_nothing() {
        let mut host = host();
        host.lock_path(OPEN);
        let mut reg = AccelRegistry::new();

        assert!(!reg.change(&mut host, OPEN, "F2"));
        assert!(reg.get(OPEN).is_none());
        assert_eq!(host.lookup(OPEN).as_deref(), Some("<Control>o"));
    }

    #[test]
    fn test_revert_after_path_registered_late() {
        let mut host = AccelMap::new();
        let mut reg = AccelRegistry::new();

        assert!(!reg.change(&mut host, OPEN, "F2"));

        host.add_entry(OPEN, "<Control>o");
        assert!(reg.change(&mut host, OPEN, "F2"));
        assert_eq!(reg.get(OPEN).unwrap().default, "<Control>o");

        reg.revert_all(&mut host);
        assert_eq!(host.lookup(OPEN).as_deref(), Some("<Control>o"));
    }

    #[test]
    fn test_save_file_failure_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // The target is a directory, so the final rename fails.
        let path = dir.path().join("accels");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        let mut host = host();
        let mut reg = AccelRegistry::new();
        reg.change(&mut host, OPEN, "F2");

        assert!(matches!(reg.save_file(&path), Err(NemoError::Io(_))));
        assert!(!dir.path().join("accels.tmp").exists());
    }

    #[test]
    fn test_revert_all() {
        let mut host = host();
        let mut reg = AccelRegistry::new();
        reg.change(&mut host, EXTRA_PANE, "");
        reg.change(&mut host, OPEN, "<Control>g");
        reg.change(&mut host, COPY, "F5");

        reg.revert_all(&mut host);

        assert!(reg.is_empty());
        assert_eq!(host.lookup(EXTRA_PANE).as_deref(), Some("F3"));
        assert_eq!(host.lookup(OPEN).as_deref(), Some("<Control>o"));
        assert_eq!(host.lookup(COPY).as_deref(), Some(""));
    }

    #[test]
    fn test_save_change_load_restores() {
        let mut host = host();
        let mut reg = AccelRegistry::new();
        reg.change(&mut host, EXTRA_PANE, "F4");
        reg.change(&mut host, COPY, "F5");
        let saved_state = reg.clone();

        let mut buf = Vec::new();
        reg.save(&mut buf).unwrap();

        reg.change(&mut host, EXTRA_PANE, "F12");
        reg.change(&mut host, OPEN, "F11");

        reg.load(&mut host, buf.as_slice()).unwrap();

        assert_eq!(reg, saved_state);
        // Path with spaces survives the trip.
        assert_eq!(reg.get(EXTRA_PANE).unwrap().current, "F4");
        assert_eq!(reg.get(EXTRA_PANE).unwrap().default, "F3");
        assert_eq!(host.lookup(EXTRA_PANE).as_deref(), Some("F4"));
        assert!(reg.get(OPEN).is_none());
    }

    #[test]
    fn test_load_uses_saved_default() {
        let mut host = host();
        let mut reg = AccelRegistry::new();
        let input = format!(
            "{} {} {}\n",
            format::escape(OPEN),
            format::escape("F2"),
            format::escape("<Shift>o")
        );

        reg.load(&mut host, input.as_bytes()).unwrap();

        let entry = reg.get(OPEN).unwrap();
        assert_eq!(entry.current, "F2");
        assert_eq!(entry.default, "<Shift>o");
        assert_eq!(host.lookup(OPEN).as_deref(), Some("F2"));

        // Later changes keep the loaded default.
        reg.change(&mut host, OPEN, "F3");
        assert_eq!(reg.get(OPEN).unwrap().default, "<Shift>o");
    }

    #[test]
    fn test_load_malformed_applies_nothing() {
        let mut host = host();
        let mut reg = AccelRegistry::new();
        reg.change(&mut host, COPY, "F5");
        let before = reg.clone();

        let input = format!("{} F1 F2\ngarbage line\n", format::escape(OPEN));
        let err = reg.load(&mut host, input.as_bytes()).unwrap_err();

        assert!(matches!(err, NemoError::MalformedRecord { line: 2, fields: 2 }));
        assert_eq!(reg, before);
        assert_eq!(host.lookup(OPEN).as_deref(), Some("<Control>o"));
    }

    #[test]
    fn test_load_keeps_records_rejected_by_host() {
        let mut host = host();
        let mut reg = AccelRegistry::new();
        let input = "%3CActions%3E%2FGone F5 %\n";

        reg.load(&mut host, input.as_bytes()).unwrap();

        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get("<Actions>/Gone").unwrap().current, "F5");
    }

    #[test]
    fn test_save_is_sorted_by_path() {
        let mut host = host();
        let mut reg = AccelRegistry::new();
        reg.change(&mut host, OPEN, "F1");
        reg.change(&mut host, COPY, "F5");
        reg.change(&mut host, EXTRA_PANE, "");

        let mut buf = Vec::new();
        reg.save(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let paths: Vec<String> = text
            .lines()
            .map(|l| format::unescape(l.split(' ').next().unwrap()).unwrap())
            .collect();
        assert_eq!(paths, vec![COPY, OPEN, EXTRA_PANE]);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("accels");
        let mut original = host();
        let mut reg = AccelRegistry::new();
        reg.change(&mut original, EXTRA_PANE, "");
        reg.save_file(&path).unwrap();
        assert!(path.exists());

        let mut fresh_host = host();
        let mut loaded = AccelRegistry::new();
        loaded.load_file(&mut fresh_host, &path).unwrap();
        assert_eq!(loaded, reg);
        assert_eq!(fresh_host.lookup(EXTRA_PANE).as_deref(), Some(""));
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = host();
        let mut reg = AccelRegistry::new();
        match reg.load_file(&mut host, &dir.path().join("absent")) {
            Err(NemoError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
