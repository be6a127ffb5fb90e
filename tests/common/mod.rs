#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use encoding_rs::EUC_KR;
use tempfile::{TempDir, tempdir};

/// Scratch data directory that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes raw bytes into a file under the workspace and returns the path.
    pub fn write_bytes(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents).expect("write temp file contents");
        path
    }

    /// Writes `contents` as UTF-8.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        self.write_bytes(name, contents.as_bytes())
    }

    /// Writes `contents` encoded as EUC-KR, the way most district exports arrive.
    pub fn write_euc_kr(&self, name: &str, contents: &str) -> PathBuf {
        let (bytes, _, had_errors) = EUC_KR.encode(contents);
        assert!(!had_errors, "fixture text must be representable in EUC-KR");
        self.write_bytes(name, &bytes)
    }
}

/// Region-code-only export: anonymous headers, index plus locality fragment.
pub const GURO_REGION_CSV: &str = "0,1\n1,194구로3동\n2,195구로4동\n3,196개봉1동\n";

/// Well-formed export with named coordinate and address columns.
pub const MAPO_CSV: &str = "연번,설치장소 주소,위도,경도\n\
1,서울특별시 마포구 월드컵로 1,37.5563,126.9084\n\
2,서울특별시 마포구 독막로 10,37.5481,126.9225\n\
3,,37.55,126.91\n";

/// Export whose coordinates are projected metres rather than degrees.
pub const GEUMCHEON_CSV: &str = "주소,위도,경도\n\
서울특별시 금천구 가산디지털1로 1,191234.5,443210.1\n\
서울특별시 금천구 독산로 5,0,0\n";
