use crate::models::{ResultEntry, ResultsResponse, TopPick};

pub fn render_index(results: &ResultsResponse) -> String {
    let rows: String = results.ranked.iter().map(render_row).collect();
    let rows = if rows.is_empty() {
        r#"<p class="empty">No designs in the catalog yet.</p>"#.to_string()
    } else {
        rows
    };

    INDEX_HTML
        .replace("{{TOTAL}}", &results.total_votes.to_string())
        .replace("{{ORIGINAL_PCT}}", &format!("{:.1}", results.original_pct))
        .replace("{{ORIGINAL}}", &results.total_original.to_string())
        .replace("{{AI_PCT}}", &format!("{:.1}", results.ai_pct))
        .replace("{{AI}}", &results.total_ai.to_string())
        .replace(
            "{{TOP_ORIGINAL}}",
            &render_top(results.top_original.as_ref(), "prefer original"),
        )
        .replace("{{TOP_AI}}", &render_top(results.top_ai.as_ref(), "prefer AI"))
        .replace("{{ROWS}}", &rows)
}

fn render_top(pick: Option<&TopPick>, caption: &str) -> String {
    let Some(pick) = pick else {
        return r#"<p class="empty">No votes yet.</p>"#.to_string();
    };
    format!(
        r#"<div class="top">
          <img src="{image}" alt="{name}" />
          <div>
            <h3>{name}</h3>
            <p class="subtitle">{description}</p>
            <span class="badge">{share:.1}% {caption}</span>
          </div>
        </div>"#,
        image = escape_html(&pick.image_url),
        name = escape_html(&pick.name),
        description = escape_html(&pick.description),
        share = pick.share_pct,
    )
}

fn render_row(entry: &ResultEntry) -> String {
    let id = escape_html(&urlencoding::encode(&entry.id));
    format!(
        r#"<article class="row">
        <header>
          <h3>{name}</h3>
          <span class="subtitle">{total} total votes &middot; {price}</span>
        </header>
        <div class="designs">
          <figure>
            <img src="{original_image}" alt="{name} original" />
            <figcaption>Original: {original} votes ({pct_original}%)</figcaption>
            <div class="bar"><span style="width: {pct_original}%"></span></div>
            <form method="post" action="/vote/{id}/original"><button class="btn-original" type="submit">Vote for Design A</button></form>
          </figure>
          <figure>
            <img src="{ai_image}" alt="{name} AI" />
            <figcaption>AI-generated: {ai} votes ({pct_ai}%)</figcaption>
            <div class="bar"><span style="width: {pct_ai}%"></span></div>
            <form method="post" action="/vote/{id}/ai"><button class="btn-ai" type="submit">Vote for Design B</button></form>
          </figure>
        </div>
      </article>"#,
        name = escape_html(&entry.name),
        total = entry.total,
        price = escape_html(&entry.price),
        original_image = escape_html(&entry.original_image_url),
        ai_image = escape_html(&entry.ai_image_url),
        original = entry.original,
        ai = entry.ai,
        pct_original = entry.pct_original,
        pct_ai = entry.pct_ai,
    )
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            // Keeps catalog text from forming template placeholders.
            '{' => escaped.push_str("&#123;"),
            '}' => escaped.push_str("&#125;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Original vs AI Hoodies</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #f3f0ea;
      --bg-2: #c9d6e8;
      --ink: #24262b;
      --accent: #6a4cff;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.88);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #e8ecf4 60%, #f6f4ef 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(960px, 100%);
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(2rem, 4vw, 2.8rem);
      margin: 0;
    }

    h2, h3 {
      margin: 0;
    }

    .subtitle {
      margin: 0;
      color: #5f5c57;
    }

    .panel, .tops {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(220px, 1fr));
      gap: 16px;
    }

    .stat, .card, .row {
      background: white;
      border-radius: 18px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 10px;
    }

    .stat .label {
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #8b857d;
    }

    .stat .value {
      font-size: 1.7rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .top {
      display: flex;
      gap: 16px;
      align-items: center;
    }

    .top img {
      width: 80px;
      height: 96px;
      object-fit: cover;
      border-radius: 12px;
    }

    .badge {
      display: inline-block;
      margin-top: 8px;
      padding: 4px 10px;
      border-radius: 999px;
      background: rgba(106, 76, 255, 0.12);
      color: var(--accent);
      font-size: 0.85rem;
    }

    .designs {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(240px, 1fr));
      gap: 16px;
    }

    figure {
      margin: 0;
      display: grid;
      gap: 8px;
    }

    figure img {
      width: 100%;
      aspect-ratio: 5 / 6;
      object-fit: cover;
      border-radius: 14px;
      background: #eef0f4;
    }

    .bar {
      height: 8px;
      border-radius: 999px;
      background: #eceae6;
      overflow: hidden;
    }

    .bar span {
      display: block;
      height: 100%;
      background: linear-gradient(90deg, var(--accent), #b06bff);
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 12px 18px;
      width: 100%;
      font-size: 0.95rem;
      font-weight: 600;
      cursor: pointer;
      color: white;
    }

    .btn-original {
      background: var(--accent-2);
    }

    .btn-ai {
      background: var(--accent);
    }

    .empty {
      color: #8b857d;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Voting Results</h1>
      <p class="subtitle">See how original designs stack up against AI-generated alternatives.</p>
    </header>

    <section class="panel">
      <div class="stat">
        <span class="label">Total votes</span>
        <span class="value">{{TOTAL}}</span>
      </div>
      <div class="stat">
        <span class="label">Original designs</span>
        <span class="value">{{ORIGINAL_PCT}}%</span>
        <span class="subtitle">{{ORIGINAL}} votes</span>
      </div>
      <div class="stat">
        <span class="label">AI-generated</span>
        <span class="value">{{AI_PCT}}%</span>
        <span class="subtitle">{{AI}} votes</span>
      </div>
    </section>

    <section class="tops">
      <div class="card">
        <h2>Top original design</h2>
        {{TOP_ORIGINAL}}
      </div>
      <div class="card">
        <h2>Top AI design</h2>
        {{TOP_AI}}
      </div>
    </section>

    <section>
      <h2>Detailed results</h2>
      {{ROWS}}
    </section>
  </main>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{build_results, join_tallies};
    use crate::catalog::fallback_catalog;
    use crate::models::VoteTally;
    use std::collections::BTreeMap;

    #[test]
    fn renders_totals_and_vote_forms() {
        let mut tallies = BTreeMap::new();
        tallies.insert("1".to_string(), VoteTally::new(145, 132));
        let results = build_results(&join_tallies(&fallback_catalog(), &tallies));

        let html = render_index(&results);
        assert!(html.contains("277"));
        assert!(html.contains("52.3%"));
        assert!(html.contains(r#"action="/vote/1/ai""#));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn renders_empty_catalog() {
        let html = render_index(&build_results(&[]));
        assert!(html.contains("No designs in the catalog yet."));
        assert!(html.contains("No votes yet."));
    }

    #[test]
    fn vote_forms_encode_ids_as_path_segments() {
        let mut pair = fallback_catalog().remove(0);
        pair.id = "a/b c?x".to_string();
        let html = render_index(&build_results(&join_tallies(&[pair], &BTreeMap::new())));
        assert!(html.contains(r#"action="/vote/a%2Fb%20c%3Fx/original""#));
        assert!(html.contains(r#"action="/vote/a%2Fb%20c%3Fx/ai""#));
    }

    #[test]
    fn catalog_text_is_not_expanded_as_template() {
        let mut pair = fallback_catalog().remove(0);
        pair.name = "{{ROWS}}".to_string();
        pair.description = "{{TOP_AI}} {{TOTAL}}".to_string();
        let mut tallies = BTreeMap::new();
        tallies.insert(pair.id.clone(), VoteTally::new(3, 1));
        let html = render_index(&build_results(&join_tallies(&[pair], &tallies)));
        assert_eq!(html.matches(r#"<article class="row">"#).count(), 1);
        assert!(html.contains("&#123;&#123;ROWS&#125;&#125;"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn escapes_catalog_text() {
        assert_eq!(
            escape_html(r#"<b>"Bold" & 'Co'</b>"#),
            "&lt;b&gt;&quot;Bold&quot; &amp; &#39;Co&#39;&lt;/b&gt;"
        );
    }
}
