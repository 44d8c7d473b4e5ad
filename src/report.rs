use serde::{Deserialize, Serialize};

pub const MAX_SCORE: i64 = 100;
pub const ITEMS_PER_LIST: usize = 3;

/// Strengths, weaknesses and recommendations for one scoring dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisBlock {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
}

impl AnalysisBlock {
    /// Drop anything past the third item of each list.
    fn truncate(&mut self) {
        self.strengths.truncate(ITEMS_PER_LIST);
        self.weaknesses.truncate(ITEMS_PER_LIST);
        self.recommendations.truncate(ITEMS_PER_LIST);
    }

    fn is_complete(&self) -> bool {
        [&self.strengths, &self.weaknesses, &self.recommendations]
            .iter()
            .all(|list| list.len() == ITEMS_PER_LIST)
    }
}

/// The scored EEAT report as produced by the text-generation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub overall_score: i64,
    pub eeat_score: i64,
    pub helpful_content_score: i64,
    pub visual_score: i64,
    pub eeat_analysis: AnalysisBlock,
    pub helpful_content_analysis: AnalysisBlock,
    pub visual_analysis: AnalysisBlock,
}

impl AnalysisReport {
    /// Scores outside 0..=100, by field name.
    pub fn out_of_range_scores(&self) -> Vec<(&'static str, i64)> {
        [
            ("overallScore", self.overall_score),
            ("eeatScore", self.eeat_score),
            ("helpfulContentScore", self.helpful_content_score),
            ("visualScore", self.visual_score),
        ]
        .into_iter()
        .filter(|(_, score)| !(0..=MAX_SCORE).contains(score))
        .collect()
    }

    pub(crate) fn truncate_lists(&mut self) {
        for block in self.blocks_mut() {
            block.truncate();
        }
    }

    /// Whether every list holds exactly three items.
    pub fn is_complete(&self) -> bool {
        [
            &self.eeat_analysis,
            &self.helpful_content_analysis,
            &self.visual_analysis,
        ]
        .iter()
        .all(|block| block.is_complete())
    }

    fn blocks_mut(&mut self) -> [&mut AnalysisBlock; 3] {
        [
            &mut self.eeat_analysis,
            &mut self.helpful_content_analysis,
            &mut self.visual_analysis,
        ]
    }

    /// Canned report served in preview mode.
    pub fn sample() -> Self {
        fn strings(items: [&str; 3]) -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        }

        Self {
            overall_score: 72,
            eeat_score: 68,
            helpful_content_score: 75,
            visual_score: 73,
            eeat_analysis: AnalysisBlock {
                strengths: strings([
                    "Clear author credentials and expertise displayed on article pages",
                    "Content includes citations to authoritative sources",
                    "About page provides detailed company background and team expertise",
                ]),
                weaknesses: strings([
                    "Limited evidence of first-hand experience in some topic areas",
                    "Inconsistent attribution of sources across different content sections",
                    "Missing credentials for some content contributors",
                ]),
                recommendations: strings([
                    "Add author bios with relevant qualifications to all content pieces",
                    "Include more case studies and first-hand experiences to demonstrate expertise",
                    "Implement structured data markup for author expertise and organization credentials",
                ]),
            },
            helpful_content_analysis: AnalysisBlock {
                strengths: strings([
                    "Content addresses specific user questions comprehensively",
                    "Clear, scannable structure with helpful headings and subheadings",
                    "Provides unique insights not found in competing content",
                ]),
                weaknesses: strings([
                    "Some content appears to be written primarily for search engines rather than users",
                    "Excessive keyword usage in certain sections feels unnatural",
                    "Limited use of helpful multimedia elements to enhance understanding",
                ]),
                recommendations: strings([
                    "Revise content to focus on solving user problems rather than keyword optimization",
                    "Add more practical examples, images, and videos to illustrate key points",
                    "Expand content depth in areas where user questions aren't fully addressed",
                ]),
            },
            visual_analysis: AnalysisBlock {
                strengths: strings([
                    "Clean, professional layout that enhances content readability",
                    "Consistent branding elements establish visual trustworthiness",
                    "Good use of white space and typography hierarchy",
                ]),
                weaknesses: strings([
                    "Mobile responsiveness issues on some content sections",
                    "Inconsistent image quality throughout the site",
                    "Some interactive elements lack clear visual affordances",
                ]),
                recommendations: strings([
                    "Improve mobile layout, especially for tables and complex content",
                    "Standardize image quality and implement lazy loading for performance",
                    "Enhance visual cues for interactive elements to improve usability",
                ]),
            },
        }
    }
}
