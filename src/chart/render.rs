use serde_json::json;

use super::ChartOutput;
use crate::config::ChartRequest;

const TABLE_SIZE: (u32, u32) = (1000, 500);
const MOTION_SIZE: (u32, u32) = (600, 300);

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="UTF-8"/>
    <title>Data Visualizer: __TITLE__</title>
    <script type="text/javascript" src="https://www.gstatic.com/charts/loader.js"></script>
    <script type="text/javascript">
      var spec = __SPEC__;
      google.charts.load("current", {packages: [spec.package]});
      google.charts.setOnLoadCallback(function () {
        var data = new google.visualization.DataTable();
        spec.columns.forEach(function (c) { data.addColumn(c.type, c.label); });
        data.addRows(spec.rows.map(function (row) {
          return row.map(function (v, j) {
            var c = spec.columns[j];
            return c && c.type === "date" ? new Date(v[0], v[1], v[2]) : v;
          });
        }));
        var chart = new google.visualization[spec.chart](document.getElementById("chart_div"));
        chart.draw(data, spec.options);
      });
    </script>
  </head>
  <body>
    <h3>Data Visualizer</h3>
    <div id="chart_div"></div>
    <div id="info">
      Data source is <a href="__SOURCE_URL__">__PAGE__</a> on __PROJECT__.
    </div>
  </body>
</html>
"#;

pub fn to_json(output: &ChartOutput) -> serde_json::Result<String> {
    serde_json::to_string_pretty(output)
}

/// Standalone page that draws the chart with the Google Visualization loader.
pub fn to_html(output: &ChartOutput, request: &ChartRequest) -> serde_json::Result<String> {
    let spec = script_spec(output);
    // `</` inside a script block would close it early.
    let spec = serde_json::to_string(&spec)?.replace("</", "<\\/");
    let source_url = format!("https://{}/wiki/{}", request.project, request.page);

    Ok(PAGE_TEMPLATE
        .replace("__TITLE__", &escape_html(&request.title))
        .replace("__SOURCE_URL__", &escape_html(&source_url))
        .replace("__PAGE__", &escape_html(&request.display_name))
        .replace("__PROJECT__", &escape_html(&request.project))
        .replace("__SPEC__", &spec))
}

/// The JSON object the page script reads: package, class, columns, rows, options.
fn script_spec(output: &ChartOutput) -> serde_json::Value {
    match output {
        ChartOutput::Table(d) => {
            let mut options = json!({
                "width": TABLE_SIZE.0,
                "height": TABLE_SIZE.1,
                "title": d.title,
            });
            if let Some(hints) = &d.axis_hints {
                options["hAxis"] = json!({ "title": hints.h_title });
                if let Some(v) = &hints.v_title {
                    options["vAxis"] = json!({ "title": v });
                }
            }
            if d.legend.is_some() {
                options["legend"] = json!("none");
            }
            json!({
                "package": "corechart",
                "chart": d.kind.class_name(),
                "columns": d.columns,
                "rows": d.rows,
                "options": options,
            })
        }
        ChartOutput::Motion(m) => {
            let rows: Vec<serde_json::Value> = m
                .datasets
                .iter()
                .map(|t| {
                    json!([
                        t.id,
                        [t.date.year, t.date.month, t.date.day],
                        t.x,
                        t.y,
                        t.label
                    ])
                })
                .collect();
            json!({
                "package": "motionchart",
                "chart": "MotionChart",
                "columns": m.columns(),
                "rows": rows,
                "options": { "width": MOTION_SIZE.0, "height": MOTION_SIZE.1 },
            })
        }
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
