use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::scoring::{ItemScore, PlatformRun, PlatformSummary};

/// Minimum absolute score gap for one platform to count as ahead.
pub const COMPARISON_MARGIN: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    FirstHigher,
    SecondHigher,
    Comparable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformComparison {
    pub first: String,
    pub second: String,
    pub first_score: f64,
    pub second_score: f64,
    pub difference: f64,
    pub difference_pct: f64,
    pub verdict: Verdict,
}

impl PlatformComparison {
    pub fn between(first: &PlatformSummary, second: &PlatformSummary) -> Self {
        let difference = first.platform_score - second.platform_score;
        let difference_pct = if second.platform_score == 0.0 {
            0.0
        } else {
            difference / second.platform_score * 100.0
        };
        let verdict = if difference > COMPARISON_MARGIN {
            Verdict::FirstHigher
        } else if difference < -COMPARISON_MARGIN {
            Verdict::SecondHigher
        } else {
            Verdict::Comparable
        };

        Self {
            first: first.platform.clone(),
            second: second.platform.clone(),
            first_score: first.platform_score,
            second_score: second.platform_score,
            difference,
            difference_pct,
            verdict,
        }
    }

    pub fn conclusion(&self) -> String {
        match self.verdict {
            Verdict::FirstHigher => format!("{} audiences approve noticeably more", self.first),
            Verdict::SecondHigher => format!("{} audiences approve noticeably more", self.second),
            Verdict::Comparable => format!("{} and {} are comparable", self.first, self.second),
        }
    }
}

/// Pairwise comparisons in input order: (0,1), (0,2), ... (1,2), ...
pub fn compare_all(summaries: &[PlatformSummary]) -> Vec<PlatformComparison> {
    let mut comparisons = Vec::new();
    for (idx, first) in summaries.iter().enumerate() {
        for second in &summaries[idx + 1..] {
            comparisons.push(PlatformComparison::between(first, second));
        }
    }
    comparisons
}

pub fn write_item_scores<W: io::Write>(output: W, items: &[ItemScore]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(output);
    for item in items {
        writer.serialize(item)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn item_scores_path(out_dir: &Path, platform: &str) -> PathBuf {
    out_dir.join(format!("{}_approval_scores.csv", platform))
}

pub fn summary_path(out_dir: &Path, platform: &str) -> PathBuf {
    out_dir.join(format!("{}_summary.json", platform))
}

pub fn comparison_path(out_dir: &Path) -> PathBuf {
    out_dir.join("platform_comparison.json")
}

/// Writes the per-item table and the summary artifact for one platform. Both
/// go to `.tmp` siblings first and are renamed into place only once both
/// writes succeeded, so a failed platform leaves no partial output.
pub fn write_platform_run(out_dir: &Path, run: &PlatformRun) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(out_dir)?;
    let platform = run.summary.platform.as_str();
    let items_path = item_scores_path(out_dir, platform);
    let summary_path = summary_path(out_dir, platform);
    let items_tmp = staging_path(&items_path);
    let summary_tmp = staging_path(&summary_path);

    let staged = stage_platform_run(run, &items_tmp, &summary_tmp);
    if let Err(err) = staged {
        discard(&items_tmp);
        discard(&summary_tmp);
        return Err(err);
    }

    std::fs::rename(&items_tmp, &items_path)?;
    std::fs::rename(&summary_tmp, &summary_path)?;
    Ok((items_path, summary_path))
}

fn stage_platform_run(run: &PlatformRun, items_tmp: &Path, summary_tmp: &Path) -> Result<()> {
    let file = std::fs::File::create(items_tmp)?;
    write_item_scores(io::BufWriter::new(file), &run.items)?;
    std::fs::write(summary_tmp, serde_json::to_string_pretty(&run.summary)?)?;
    Ok(())
}

pub fn staging_path(path: &Path) -> PathBuf {
    let mut staged = path.as_os_str().to_owned();
    staged.push(".tmp");
    PathBuf::from(staged)
}

fn discard(path: &Path) {
    if path.is_file() {
        let _ = std::fs::remove_file(path);
    }
}

pub fn write_comparisons(out_dir: &Path, comparisons: &[PlatformComparison]) -> Result<PathBuf> {
    std::fs::create_dir_all(out_dir)?;
    let path = comparison_path(out_dir);
    std::fs::write(&path, serde_json::to_string_pretty(comparisons)?)?;
    Ok(path)
}
