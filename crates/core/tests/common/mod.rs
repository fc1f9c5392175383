#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Write an executable shell script named `name` into `dir`.
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod script");
    path
}

/// Fake dump_syms: emits a MODULE record for the last argument, fails if it is missing.
#[cfg(unix)]
pub fn fake_dump_syms(dir: &Path, identity: &str) -> PathBuf {
    write_script(
        dir,
        "dump_syms",
        &format!(
            r#"for last; do :; done
if [ ! -f "$last" ]; then
  echo "unable to open $last" >&2
  exit 1
fi
name=$(basename "$last")
echo "MODULE Linux x86_64 {identity} $name"
echo "FILE 0 /src/$name.c"
echo "FUNC 1000 10 0 main""#
        ),
    )
}

/// Fake objdump that prints the given `NEEDED` entries.
#[cfg(unix)]
pub fn fake_objdump(dir: &Path, needed: &[&str]) -> PathBuf {
    let mut body = String::from(
        "echo \"$2:     file format elf64-x86-64\"\necho\necho \"Dynamic Section:\"\n",
    );
    for name in needed {
        body.push_str(&format!("echo \"  NEEDED               {name}\"\n"));
    }
    body.push_str("echo \"  SONAME               libself.so\"");
    write_script(dir, "objdump", &body)
}

/// Create a placeholder binary file and return its path.
pub fn touch(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"\x7fELF-not-really").expect("write binary");
    path
}

/// Names of all entries in a zip archive, in archive order.
pub fn zip_entries(path: &Path) -> Vec<String> {
    let file = fs::File::open(path).expect("open zip");
    let mut archive = zip::ZipArchive::new(file).expect("read zip");
    (0..archive.len())
        .map(|i| archive.by_index(i).expect("zip entry").name().to_string())
        .collect()
}
