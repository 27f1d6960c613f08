use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub type LogFile = Arc<Mutex<BufWriter<File>>>;

/// logs/<prefix>_<日時>.log を作成
pub fn open_log_file(prefix: &str) -> Result<LogFile> {
    let (file, path) = open_log_file_in("logs", prefix)?;
    eprintln!("Log: {}", path.display());
    Ok(file)
}

pub fn open_log_file_in<P: AsRef<Path>>(dir: P, prefix: &str) -> Result<(LogFile, PathBuf)> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let ts = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("{}_{}.log", prefix, ts));
    let file = File::create(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    Ok((Arc::new(Mutex::new(BufWriter::new(file))), path))
}

/// stderrとログファイルの両方に出力
#[macro_export]
macro_rules! log {
    ($logfile:expr, $($arg:tt)*) => {{
        use ::std::io::Write as _;
        let msg = format!($($arg)*);
        eprintln!("{}", msg);
        if let Ok(mut f) = $logfile.lock() {
            let _ = writeln!(f, "{}", msg);
            let _ = f.flush();
        }
    }};
}
