use crate::models::{ProfitableItem, TableDump};

pub const INDEX_PAGE: &str = include_str!("../views/index.html");

const HEADER: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>{title}</title>
    <style>
        table { border-collapse: collapse; }
        th, td { border: 1px solid #999; padding: 2px 8px; }
        td.number { text-align: right; }
    </style>
</head>
<body>
"#;

const FOOTER: &str = "</body>\n</html>\n";

pub fn render_profit_page(items: &[ProfitableItem]) -> String {
    let mut page = open_page("Profitable items");

    if items.is_empty() {
        page.push_str("<p>No profitable items found.</p>\n");
        page.push_str(FOOTER);
        return page;
    }

    page.push_str(
        "<table>\n<tr><th>#</th><th>Item</th><th>City</th><th>Buy price max</th>\
         <th>Sell price min</th><th>Profit</th><th>Profit %</th></tr>\n",
    );
    for (rank, item) in items.iter().enumerate() {
        page.push_str(&format!(
            "<tr><td class=\"number\">{}</td><td>{}</td><td>{}</td>\
             <td class=\"number\">{}</td><td class=\"number\">{}</td>\
             <td class=\"number\">{}</td><td class=\"number\">{:.2}</td></tr>\n",
            rank + 1,
            escape_html(&item.item_id),
            escape_html(&item.location),
            item.max_buy_price,
            item.min_sell_price,
            item.profit,
            item.profit_percentage,
        ));
    }
    page.push_str("</table>\n");
    page.push_str(FOOTER);

    page
}

pub fn render_database_page(tables: &[TableDump]) -> String {
    let mut page = open_page("Database");

    if tables.is_empty() {
        page.push_str("<p>The database has no tables.</p>\n");
    }

    for table in tables {
        page.push_str(&format!(
            "<h2>{} ({} rows)</h2>\n",
            escape_html(&table.name),
            table.rows.len()
        ));
        page.push_str("<table>\n<tr>");
        for column in &table.columns {
            page.push_str(&format!("<th>{}</th>", escape_html(column)));
        }
        page.push_str("</tr>\n");
        for row in &table.rows {
            page.push_str("<tr>");
            for cell in row {
                page.push_str(&format!("<td>{}</td>", escape_html(cell)));
            }
            page.push_str("</tr>\n");
        }
        page.push_str("</table>\n");
    }
    page.push_str(FOOTER);

    page
}

fn open_page(title: &str) -> String {
    let mut page = HEADER.replace("{title}", title);
    page.push_str(&format!("<h1>{}</h1>\n", title));
    page.push_str("<p><a href=\"/\">Home</a></p>\n");
    page
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
