//! Snapshots of the serialized result record, the shape hosts consume.

use parinfer_common::Options;
use parinfer_core::{indent_mode, paren_mode};

#[test]
fn success_answer_shape() {
    let answer = indent_mode("(foo\n  bar", &Options::default());
    let json = serde_json::to_string_pretty(&answer).expect("answer serializes");
    insta::assert_snapshot!(json, @r#"
{
  "success": true,
  "text": "(foo\n  bar)",
  "tabStops": [],
  "parenTrails": [
    {
      "lineNo": 1,
      "startX": 5,
      "endX": 6
    }
  ]
}
"#);
}

#[test]
fn error_answer_shape() {
    let answer = paren_mode("(foo", &Options::default());
    let json = serde_json::to_string_pretty(&answer).expect("answer serializes");
    insta::assert_snapshot!(json, @r#"
{
  "success": false,
  "text": "(foo",
  "error": {
    "name": "unclosed-paren",
    "message": "Unclosed open-paren",
    "lineNo": 0,
    "x": 0
  },
  "tabStops": [],
  "parenTrails": []
}
"#);
}
