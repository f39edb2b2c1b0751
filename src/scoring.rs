//! Score formulas: percentages, grade bands, public exam statistics and the
//! exam-taker leaderboard ranking.

use serde::{Deserialize, Serialize};

use crate::domain::AssessmentResult;

/// Whole-number percentage, rounded half up. Zero questions score 0.
pub fn percentage(correct: usize, total: usize) -> u32 {
  if total == 0 {
    return 0;
  }
  ((correct as f64 / total as f64) * 100.0).round() as u32
}

/// A perfect practice run marks the collection as learned.
pub fn qualifies_as_learned(result: &AssessmentResult) -> bool {
  result.is_perfect()
}

/// Format seconds as `m:ss` for the exam clock and result screen.
pub fn format_clock(seconds: u32) -> String {
  format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
  Excellent,
  Good,
  Average,
  Weak,
  Poor,
}

impl Grade {
  pub fn from_percentage(percentage: u32) -> Self {
    match percentage {
      90.. => Self::Excellent,
      80..=89 => Self::Good,
      70..=79 => Self::Average,
      60..=69 => Self::Weak,
      _ => Self::Poor,
    }
  }
}

/// Attempt statistics of a shared exam.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PublicExamStats {
  pub total_attempts: u32,
  /// Running mean of attempt percentages
  pub average_score: f64,
}

impl PublicExamStats {
  pub fn record(&mut self, percentage: u32) {
    let attempts = self.total_attempts as f64;
    self.average_score = (self.average_score * attempts + percentage as f64) / (attempts + 1.0);
    self.total_attempts += 1;
  }
}

/// Per-user exam statistics used by the leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamTakerStats {
  pub user_id: String,
  pub username: String,
  pub total_exams: u32,
  /// Mean exam percentage
  pub average_exam_score: f64,
  /// Exams finished with 100%
  pub perfect_exams: u32,
}

impl ExamTakerStats {
  pub fn from_percentages(
    user_id: &str,
    username: &str,
    percentages: impl IntoIterator<Item = u32>,
  ) -> Self {
    let mut total = 0u32;
    let mut sum = 0u64;
    let mut perfect = 0u32;
    for pct in percentages {
      total += 1;
      sum += pct as u64;
      if pct >= 100 {
        perfect += 1;
      }
    }

    Self {
      user_id: user_id.to_string(),
      username: username.to_string(),
      total_exams: total,
      average_exam_score: if total > 0 { sum as f64 / total as f64 } else { 0.0 },
      perfect_exams: perfect,
    }
  }

  /// Average score scaled by participation: rewards more exams, but not linearly.
  pub fn weighted_score(&self) -> f64 {
    self.average_exam_score * (self.total_exams.max(1) as f64).sqrt()
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedExamTaker {
  pub rank: usize,
  pub weighted_score: f64,
  #[serde(flatten)]
  pub stats: ExamTakerStats,
}

/// Rank users who took at least one exam.
///
/// Order: weighted score, then number of exams, then raw average, all descending.
pub fn rank_exam_takers(stats: Vec<ExamTakerStats>) -> Vec<RankedExamTaker> {
  let mut takers: Vec<ExamTakerStats> = stats.into_iter().filter(|s| s.total_exams > 0).collect();

  takers.sort_by(|a, b| {
    b.weighted_score()
      .total_cmp(&a.weighted_score())
      .then_with(|| b.total_exams.cmp(&a.total_exams))
      .then_with(|| b.average_exam_score.total_cmp(&a.average_exam_score))
  });

  takers
    .into_iter()
    .enumerate()
    .map(|(i, stats)| RankedExamTaker {
      rank: i + 1,
      weighted_score: stats.weighted_score(),
      stats,
    })
    .collect()
}
