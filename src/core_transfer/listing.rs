//! Directory listing formats for LIST (`ls -l` style) and MLSD (RFC 3659 facts).

use crate::constants::LIST_RECENT_SECS;
use chrono::{DateTime, Local, Utc};
use log::warn;
use std::fs::Metadata;
use std::io;
use std::path::Path;
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFormat {
    Unix,
    Machine,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
    pub modified: Option<SystemTime>,
    pub mode: u32,
    pub nlink: u64,
    pub uid: u32,
    pub gid: u32,
}

impl ListEntry {
    pub fn from_metadata(name: String, metadata: &Metadata) -> Self {
        let (mode, nlink, uid, gid) = ownership(metadata);
        Self {
            name,
            is_dir: metadata.is_dir(),
            size: metadata.len(),
            modified: metadata.modified().ok(),
            mode,
            nlink,
            uid,
            gid,
        }
    }
}

#[cfg(unix)]
fn ownership(metadata: &Metadata) -> (u32, u64, u32, u32) {
    use std::os::unix::fs::MetadataExt;
    (metadata.mode(), metadata.nlink(), metadata.uid(), metadata.gid())
}

#[cfg(not(unix))]
fn ownership(metadata: &Metadata) -> (u32, u64, u32, u32) {
    let mode = if metadata.is_dir() { 0o755 } else { 0o644 };
    (mode, 1, 0, 0)
}

/// Reads what a listing of `path` should show.
///
/// A directory yields its entries sorted by name, without `.` and `..`. A
/// plain file yields itself, but only for the Unix format; MLSD requires a
/// directory.
pub async fn read_listing(path: &Path, format: ListFormat) -> io::Result<Vec<ListEntry>> {
    let metadata = tokio::fs::metadata(path).await?;
    if !metadata.is_dir() {
        if format == ListFormat::Machine {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "not a directory"));
        }
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        return Ok(vec![ListEntry::from_metadata(name, &metadata)]);
    }

    let mut entries = Vec::new();
    let mut dir = tokio::fs::read_dir(path).await?;
    while let Some(entry) = dir.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name == "." || name == ".." {
            continue;
        }
        // Follow symlinks so a link shows what it points to.
        match tokio::fs::metadata(entry.path()).await {
            Ok(metadata) => entries.push(ListEntry::from_metadata(name, &metadata)),
            Err(e) => warn!("Skipping {:?} in listing: {}", entry.path(), e),
        }
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

pub fn permission_string(is_dir: bool, mode: u32) -> String {
    let mut perms = String::with_capacity(10);
    perms.push(if is_dir { 'd' } else { '-' });
    for shift in [6, 3, 0] {
        let bits = (mode >> shift) & 0o7;
        perms.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        perms.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        perms.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    perms
}

fn list_date(modified: Option<SystemTime>, now: DateTime<Local>) -> String {
    let modified: DateTime<Local> = modified.map(DateTime::from).unwrap_or(now);
    let age = now.signed_duration_since(modified).num_seconds();
    if (0..LIST_RECENT_SECS).contains(&age) {
        modified.format("%b %e %H:%M").to_string()
    } else {
        modified.format("%b %e  %Y").to_string()
    }
}

pub fn format_unix(entry: &ListEntry, now: DateTime<Local>) -> String {
    format!(
        "{} {:>3} {:<8} {:<8} {:>10} {} {}\r\n",
        permission_string(entry.is_dir, entry.mode),
        entry.nlink,
        entry.uid,
        entry.gid,
        entry.size,
        list_date(entry.modified, now),
        entry.name
    )
}

pub fn format_machine(entry: &ListEntry) -> String {
    let modify: DateTime<Utc> = entry.modified.map(DateTime::from).unwrap_or_else(Utc::now);
    format!(
        "type={};size={};modify={}; {}\r\n",
        if entry.is_dir { "dir" } else { "file" },
        entry.size,
        modify.format("%Y%m%d%H%M%S"),
        entry.name
    )
}

pub fn render(entries: &[ListEntry], format: ListFormat, now: DateTime<Local>) -> String {
    entries
        .iter()
        .map(|entry| match format {
            ListFormat::Unix => format_unix(entry, now),
            ListFormat::Machine => format_machine(entry),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::time::{Duration, UNIX_EPOCH};

    fn entry(name: &str, is_dir: bool, modified: SystemTime) -> ListEntry {
        ListEntry {
            name: name.to_string(),
            is_dir,
            size: 1234,
            modified: Some(modified),
            mode: if is_dir { 0o40755 } else { 0o100644 },
            nlink: 1,
            uid: 1000,
            gid: 1000,
        }
    }

    #[test]
    fn permission_bits_render_like_ls() {
        assert_eq!(permission_string(true, 0o755), "drwxr-xr-x");
        assert_eq!(permission_string(false, 0o100644), "-rw-r--r--");
        assert_eq!(permission_string(false, 0o000), "----------");
    }

    #[test]
    fn recent_entries_show_time_old_entries_show_year() {
        let now = Local.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let recent: SystemTime = Local.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap().into();
        let old: SystemTime = Local.with_ymd_and_hms(2021, 3, 9, 8, 30, 0).unwrap().into();

        let line = format_unix(&entry("log.txt", false, recent), now);
        assert!(line.starts_with("-rw-r--r--   1 1000     1000           1234 Jun  1 08:30 log.txt"));
        assert!(line.ends_with(" log.txt\r\n"));

        let line = format_unix(&entry("old", true, old), now);
        assert!(line.starts_with("drwxr-xr-x"));
        assert!(line.contains("Mar  9  2021 old\r\n"));
    }

    #[test]
    fn machine_format_has_type_size_modify_facts() {
        let modified = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let line = format_machine(&entry("data.bin", false, modified));
        assert_eq!(line, "type=file;size=1234;modify=20231114221320; data.bin\r\n");

        let line = format_machine(&entry("sub", true, modified));
        assert!(line.starts_with("type=dir;"));
    }

    #[tokio::test]
    async fn listing_skips_dot_entries_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), b"bb").unwrap();
        std::fs::write(dir.path().join("a.txt"), b"a").unwrap();
        std::fs::create_dir(dir.path().join("c")).unwrap();

        let entries = read_listing(dir.path(), ListFormat::Unix).await.unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a.txt", "b.txt", "c"]);
        assert_eq!(entries[1].size, 2);
        assert!(entries[2].is_dir);
    }

    #[tokio::test]
    async fn file_target_lists_itself_for_list_only() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("single.txt");
        std::fs::write(&file, b"12345").unwrap();

        let entries = read_listing(&file, ListFormat::Unix).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "single.txt");
        assert_eq!(entries[0].size, 5);

        assert!(read_listing(&file, ListFormat::Machine).await.is_err());
    }
}
