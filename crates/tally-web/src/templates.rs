//! HTML templates, compiled once at startup.
//!
//! Pages are rendered with handlebars from view models built in
//! [`crate::pages`]; all formatting of numbers happens there, so the
//! templates only place strings.

use handlebars::{Handlebars, RenderError, TemplateError};
use serde::Serialize;

const HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{{title}}</title>
  <style>
    body { font-family: sans-serif; margin: 2em; }
    table { border-collapse: collapse; }
    th, td { border: 1px solid #999; padding: 5px 10px; }
    td.num { text-align: right; }
    .badge { font-size: 0.8em; padding: 1px 6px; border-radius: 4px; }
    .locked { background: #eee; color: #666; }
    .open { background: #d4f4dd; color: #185c2c; }
    .notice { color: #8a5300; }
    .negative { color: #b00020; }
  </style>
</head>
<body>
"#;

const FOOT: &str = "</body>\n</html>\n";

const HOME: &str = r#"{{> head}}
<h1>Sales Entry {{year}}</h1>
<p>
  <a href="/?year={{prev_year}}">&larr; {{prev_year}}</a> |
  <a href="/?year={{next_year}}">{{next_year}} &rarr;</a>
</p>
{{#if watermark}}<p>Latest entered period: {{watermark}}</p>{{/if}}
<ul>
{{#each months}}
  <li>
    <a href="/enter/{{this.period}}">{{this.name}}</a>
    {{#if this.locked}}<span class="badge locked">locked</span>{{/if}}
    {{#if this.current}}<span class="badge open">current</span>{{/if}}
  </li>
{{/each}}
</ul>
<p>
  <a href="/report?year={{year}}">View Report</a> |
  <a href="/export.xlsx?year={{year}}">Download Excel</a>
</p>
{{> foot}}"#;

const ENTRY: &str = r#"{{> head}}
<h2>Enter Sales for {{month_name}} {{year}}</h2>
{{#if locked}}
<p class="notice">This period is read-only: data has already been entered for {{watermark}}.</p>
{{/if}}
<form method="post">
  <table>
    <tr><th>Product</th>{{#if stock_period}}<th>Stock</th>{{/if}}<th>Sales</th></tr>
    {{#each rows}}
    <tr>
      <td>{{this.product}}</td>
      {{#if @root.stock_period}}
      <td><input type="number" min="0" name="stock_{{this.product}}" value="{{this.stock}}" {{#if @root.locked}}readonly{{/if}}></td>
      {{/if}}
      <td><input type="number" min="0" name="sales_{{this.product}}" value="{{this.sold}}" {{#if @root.locked}}readonly{{/if}}></td>
    </tr>
    {{/each}}
  </table>
  {{#unless locked}}<button type="submit">Save</button>{{/unless}}
</form>
<a href="/?year={{year}}">&larr; Back</a>
{{> foot}}"#;

const REPORT: &str = r#"{{> head}}
<h1>Sales Report {{year}}</h1>

<div style="display:flex; gap:20px;">
  <div style="flex:1;">
    <h3>Monthly Sales Trend</h3>
    <canvas id="lineChart"></canvas>
  </div>
  <div style="flex:1;">
    <h3>% Contribution by Product</h3>
    <canvas id="barChart"></canvas>
  </div>
</div>

<h3>Totals</h3>
<table>
  <tr><th>Product</th><th>Total</th><th>APUS</th><th>% of Sales</th><th>Stock</th><th>Remaining</th></tr>
  {{#each rows}}
  <tr>
    <td>{{this.product}}</td>
    <td class="num">{{this.total}}</td>
    <td class="num">{{this.apus}}</td>
    <td class="num">{{this.percent}}%</td>
    <td class="num">{{this.stock}}</td>
    <td class="num{{#if this.oversold}} negative{{/if}}">{{this.remaining}}</td>
  </tr>
  {{/each}}
  <tr><th>Total</th><th class="num">{{grand_total}}</th><th></th><th></th><th></th><th></th></tr>
</table>

<p>
  <a href="/export.xlsx?year={{year}}">Download Excel</a> |
  <a href="/?year={{year}}">&larr; Back</a>
</p>

<script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
<script>
const trend = {{{trend_json}}};
new Chart(document.getElementById('lineChart').getContext('2d'), {
  type: 'line',
  data: {
    labels: trend.labels,
    datasets: trend.series.map(s => ({ label: s.product, data: s.monthly, fill: false, borderWidth: 2 }))
  }
});

const share = {{{share_json}}};
new Chart(document.getElementById('barChart').getContext('2d'), {
  type: 'bar',
  data: {
    labels: share.labels,
    datasets: [{ label: '% of Sales', data: share.values, backgroundColor: 'rgba(75,192,192,0.6)' }]
  }
});
</script>
{{> foot}}"#;

/// The compiled template registry.
pub struct Templates {
  registry: Handlebars<'static>,
}

impl Templates {
  pub const HOME: &'static str = "home";
  pub const ENTRY: &'static str = "entry";
  pub const REPORT: &'static str = "report";

  pub fn new() -> Result<Self, TemplateError> {
    let mut registry = Handlebars::new();
    registry.register_partial("head", HEAD)?;
    registry.register_partial("foot", FOOT)?;
    registry.register_template_string(Self::HOME, HOME)?;
    registry.register_template_string(Self::ENTRY, ENTRY)?;
    registry.register_template_string(Self::REPORT, REPORT)?;
    Ok(Self { registry })
  }

  pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String, RenderError> {
    self.registry.render(name, data)
  }
}

/// Serialise `value` for embedding inside a `<script>` element.
///
/// `<` is escaped so a product name cannot close the element early.
pub fn script_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
  Ok(serde_json::to_string(value)?.replace('<', "\\u003c"))
}
