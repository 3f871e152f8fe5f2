use crate::error::Result;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub status_text: Option<String>,
    pub value: usize,
    pub maximum: usize,
}

impl ProgressUpdate {
    pub fn status(text: impl Into<String>) -> Self {
        Self {
            status_text: Some(text.into()),
            value: 0,
            maximum: 0,
        }
    }

    pub fn step(text: impl Into<String>, value: usize, maximum: usize) -> Self {
        Self {
            status_text: Some(text.into()),
            value,
            maximum,
        }
    }
}

/// Invoked synchronously by the engine. Returning an error unwinds the
/// current operation; that is the only way to cancel a run.
pub type ProgressCallback = Arc<dyn Fn(ProgressUpdate) -> Result<()> + Send + Sync>;

pub(crate) fn report(callback: Option<&ProgressCallback>, update: ProgressUpdate) -> Result<()> {
    match callback {
        Some(callback) => callback(update),
        None => Ok(()),
    }
}

pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} {}", UNITS[0])
    } else {
        format!("{value:.2} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::Mutex;

    #[test]
    fn format_size_scales_units() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
    }

    #[test]
    fn report_forwards_updates_and_errors() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let callback: ProgressCallback = Arc::new(move |update: ProgressUpdate| -> Result<()> {
            sink.lock().unwrap().push(update);
            Ok(())
        });
        report(Some(&callback), ProgressUpdate::status("loading")).unwrap();
        report(None, ProgressUpdate::status("ignored")).unwrap();
        assert_eq!(seen.lock().unwrap().len(), 1);

        let abort: ProgressCallback = Arc::new(|_: ProgressUpdate| -> Result<()> { Err(Error::Aborted) });
        assert!(matches!(
            report(Some(&abort), ProgressUpdate::default()),
            Err(Error::Aborted)
        ));
    }
}
