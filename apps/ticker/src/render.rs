use std::{
    env, fs, io,
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
    thread::{self, JoinHandle},
};

use anyhow::{Context, Result};
use stock::graph::{Chart, render_html, render_png};
use tracing::debug;

/// Where finished charts go: an interactive view and an image on disk.
pub trait ChartRenderer: Send + Sync {
    fn show(&self, title: &str, chart: &Chart) -> Result<()>;

    fn save(&self, chart: &Chart, path: &Path) -> Result<()>;
}

/// Writes charts as HTML to the temp dir and hands them to the desktop's
/// default viewer. PNGs are rasterized with charming's renderer.
pub struct SystemRenderer {
    open_charts: bool,
}

impl SystemRenderer {
    pub fn new(open_charts: bool) -> Self {
        Self { open_charts }
    }

    fn page_path(title: &str) -> PathBuf {
        let stem: String = title
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        env::temp_dir().join(format!("ticker_{stem}.html"))
    }
}

impl ChartRenderer for SystemRenderer {
    fn show(&self, title: &str, chart: &Chart) -> Result<()> {
        if !self.open_charts {
            debug!(title, "chart display disabled");
            return Ok(());
        }

        let html = render_html(title, chart)?;
        let path = Self::page_path(title);
        fs::write(&path, html).with_context(|| format!("writing {}", path.display()))?;

        launch(opener(&path))?;
        debug!(path = %path.display(), "chart opened");
        Ok(())
    }

    fn save(&self, chart: &Chart, path: &Path) -> Result<()> {
        let png = render_png(chart)?;
        fs::write(path, png).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

fn opener(path: &Path) -> Command {
    #[cfg(target_os = "macos")]
    let mut cmd = Command::new("open");

    #[cfg(windows)]
    let mut cmd = {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", ""]);
        cmd
    };

    #[cfg(all(unix, not(target_os = "macos")))]
    let mut cmd = Command::new("xdg-open");

    cmd.arg(path);
    cmd
}

/// Start the viewer and reap it on a side thread once it exits.
fn launch(mut cmd: Command) -> Result<JoinHandle<io::Result<ExitStatus>>> {
    let mut child = cmd
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .context("failed to launch a chart viewer")?;

    Ok(thread::spawn(move || child.wait()))
}
