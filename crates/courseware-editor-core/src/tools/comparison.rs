//! Two-column "before / after" comparison block.

use courseware_common::BlockType;
use serde::Serialize;
use serde_json::Value;

use crate::handler::{BlockHandler, BlockView, ComparisonView};

/// Stored shape of a comparison block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonData {
    pub left_title: String,
    pub right_title: String,
    pub left_points: Vec<String>,
    pub right_points: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Edits the UI can make to a comparison block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComparisonEdit {
    SetTitle { side: Side, title: String },
    /// Append an empty point row.
    AddPoint { side: Side },
    RemovePoint { side: Side, index: usize },
    SetPoint { side: Side, index: usize, text: String },
}

/// Current point rows, including blank ones still being typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonTool {
    left_title: String,
    right_title: String,
    left_points: Vec<String>,
    right_points: Vec<String>,
}

impl ComparisonTool {
    pub fn new(data: &Value) -> Self {
        let data = parse_data(data);
        Self {
            left_title: data.left_title,
            right_title: data.right_title,
            left_points: seed_rows(data.left_points),
            right_points: seed_rows(data.right_points),
        }
    }

    fn points_mut(&mut self, side: Side) -> &mut Vec<String> {
        match side {
            Side::Left => &mut self.left_points,
            Side::Right => &mut self.right_points,
        }
    }

    /// Apply an edit. Returns `false` if it referred to a missing row.
    pub fn apply(&mut self, edit: ComparisonEdit) -> bool {
        match edit {
            ComparisonEdit::SetTitle { side, title } => {
                match side {
                    Side::Left => self.left_title = title,
                    Side::Right => self.right_title = title,
                }
                true
            }
            ComparisonEdit::AddPoint { side } => {
                self.points_mut(side).push(String::new());
                true
            }
            ComparisonEdit::RemovePoint { side, index } => {
                let points = self.points_mut(side);
                if index < points.len() {
                    points.remove(index);
                    true
                } else {
                    false
                }
            }
            ComparisonEdit::SetPoint { side, index, text } => {
                match self.points_mut(side).get_mut(index) {
                    Some(point) => {
                        *point = text;
                        true
                    }
                    None => false,
                }
            }
        }
    }

    /// The stored shape, with blank rows dropped.
    pub fn data(&self) -> ComparisonData {
        ComparisonData {
            left_title: self.left_title.clone(),
            right_title: self.right_title.clone(),
            left_points: non_blank(&self.left_points),
            right_points: non_blank(&self.right_points),
        }
    }
}

/// Lenient read of stored data: wrong-typed fields become empty, non-string
/// points are skipped.
fn parse_data(data: &Value) -> ComparisonData {
    let text = |key: &str| {
        data.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let points = |key: &str| {
        data.get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    };
    ComparisonData {
        left_title: text("leftTitle"),
        right_title: text("rightTitle"),
        left_points: points("leftPoints"),
        right_points: points("rightPoints"),
    }
}

/// A fresh column starts with one empty row to type into.
fn seed_rows(points: Vec<String>) -> Vec<String> {
    if points.is_empty() {
        vec![String::new()]
    } else {
        points
    }
}

fn non_blank(points: &[String]) -> Vec<String> {
    points
        .iter()
        .map(|point| point.trim())
        .filter(|point| !point.is_empty())
        .map(str::to_string)
        .collect()
}

impl BlockHandler for ComparisonTool {
    fn block_type(&self) -> BlockType {
        BlockType::Comparison
    }

    fn render(&self) -> BlockView {
        BlockView::Comparison(ComparisonView {
            left_title: self.left_title.clone(),
            right_title: self.right_title.clone(),
            left_points: self.left_points.clone(),
            right_points: self.right_points.clone(),
        })
    }

    fn save(&self) -> Value {
        serde_json::to_value(self.data()).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_save_drops_blank_points() {
        let tool = ComparisonTool::new(&json!({
            "leftTitle": "Manual grading",
            "rightTitle": "Auto grading",
            "leftPoints": ["Slow", "", "  ", "Manual"],
            "rightPoints": ["Fast", "Automatic"],
        }));
        assert_eq!(
            tool.save(),
            json!({
                "leftTitle": "Manual grading",
                "rightTitle": "Auto grading",
                "leftPoints": ["Slow", "Manual"],
                "rightPoints": ["Fast", "Automatic"],
            })
        );
    }

    #[test]
    fn test_all_blank_points_save_as_empty() {
        let tool = ComparisonTool::new(&json!({
            "leftPoints": ["", " ", "\t"],
            "rightPoints": [],
        }));
        let data = tool.data();
        assert!(data.left_points.is_empty());
        assert!(data.right_points.is_empty());
        assert_eq!(data.left_title, "");
    }

    #[test]
    fn test_empty_block_renders_one_row_per_side() {
        let tool = ComparisonTool::new(&Value::Null);
        let BlockView::Comparison(view) = tool.render() else {
            panic!("expected comparison view");
        };
        assert_eq!(view.left_points, vec![String::new()]);
        assert_eq!(view.right_points, vec![String::new()]);
        assert_eq!(tool.save()["leftPoints"], json!([]));
    }

    #[test]
    fn test_edits_add_and_remove_rows() {
        let mut tool = ComparisonTool::new(&json!({"leftPoints": ["A"]}));
        assert!(tool.apply(ComparisonEdit::AddPoint { side: Side::Left }));
        assert!(tool.apply(ComparisonEdit::SetPoint {
            side: Side::Left,
            index: 1,
            text: "B".into(),
        }));
        assert!(tool.apply(ComparisonEdit::SetPoint {
            side: Side::Right,
            index: 0,
            text: "C".into(),
        }));
        assert!(tool.apply(ComparisonEdit::SetTitle {
            side: Side::Right,
            title: "After".into(),
        }));
        assert!(!tool.apply(ComparisonEdit::RemovePoint {
            side: Side::Right,
            index: 4,
        }));
        assert!(tool.apply(ComparisonEdit::RemovePoint {
            side: Side::Left,
            index: 0,
        }));

        let data = tool.data();
        assert_eq!(data.left_points, vec!["B"]);
        assert_eq!(data.right_points, vec!["C"]);
        assert_eq!(data.right_title, "After");
    }

    #[test]
    fn test_malformed_points_are_skipped() {
        let tool = ComparisonTool::new(&json!({
            "leftTitle": 5,
            "leftPoints": ["ok", 3, null, {"x": 1}],
            "rightPoints": "not a list",
        }));
        let data = tool.data();
        assert_eq!(data.left_title, "");
        assert_eq!(data.left_points, vec!["ok"]);
        assert!(data.right_points.is_empty());
    }
}
