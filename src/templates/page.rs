use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use std::f64::consts::PI;

use crate::input::{InputState, MAX_CHARS, MIN_CHARS};
use crate::render::{DisplayState, WarningStyle};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Ready,
    Complete,
    Error,
}

impl Status {
    fn class(&self) -> &'static str {
        match self {
            Status::Ready => "ready",
            Status::Complete => "success",
            Status::Error => "danger",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Status::Ready => "Ready",
            Status::Complete => "Analysis complete",
            Status::Error => "Error",
        }
    }
}

pub struct PageView<'a> {
    pub text: &'a str,
    pub input: InputState,
    pub status: Status,
    pub error: Option<String>,
    pub display: Option<&'a DisplayState>,
    pub show_cookie_banner: bool,
}

pub fn render(view: &PageView) -> String {
    let error_section = match &view.error {
        Some(message) => format!(
            r#"<div class="notice notice-danger" role="alert">Error: {}</div>"#,
            text(message)
        ),
        None => String::new(),
    };

    let results_section = view.display.map(results).unwrap_or_default();

    let cookie_banner = if view.show_cookie_banner {
        r#"<div class="cookie-banner" id="cookieBanner">
            <span>We use cookies to keep your session and measure usage. See our privacy policy.</span>
            <form method="post" action="/consent"><button type="submit" id="acceptCookies">Accept</button></form>
        </div>"#
    } else {
        ""
    };

    let disabled = if view.input.submit_enabled { "" } else { " disabled" };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>AI Checking | AI text detector</title>
    <style>{style}</style>
</head>
<body>
    <div class="page">
        <div class="page-header">
            <a class="wordmark" href="/">aichecking <span>/ detector</span></a>
            <span class="status-badge {status_class}" id="statusBadge">
                <span class="status-dot"></span>
                <span>{status_label}</span>
            </span>
        </div>

        <form class="card input-card" method="post" action="/check" id="checkForm">
            <textarea name="text" id="textInput" maxlength="{max_chars}" placeholder="Paste at least {min_chars} characters of text to analyze...">{text}</textarea>
            <div class="input-footer">
                <span class="char-count" id="charCount">{counter}</span>
                <button type="submit" id="analyzeBtn"{disabled}>Analyze text</button>
            </div>
        </form>

        {error_section}
        {results_section}

        <div class="loading-overlay" id="loadingOverlay"><div class="spinner"></div></div>
        {cookie_banner}
    </div>
    <script>{script}</script>
</body>
</html>"#,
        style = STYLE,
        status_class = view.status.class(),
        status_label = view.status.label(),
        max_chars = MAX_CHARS,
        min_chars = MIN_CHARS,
        text = text(view.text),
        counter = view.input.counter_label,
        disabled = disabled,
        error_section = error_section,
        results_section = results_section,
        cookie_banner = cookie_banner,
        script = SCRIPT,
    )
}

fn results(display: &DisplayState) -> String {
    let radius = display.ring_circumference / (2.0 * PI);
    let size = radius * 2.0 + 20.0;
    let center = size / 2.0;

    let warning = match &display.warning {
        Some(w) => {
            let class = match w.style {
                WarningStyle::Error => "notice-danger",
                WarningStyle::Caution => "notice-warning",
            };
            format!(
                r#"<div class="notice {}" id="shortTextWarning">&#9888;&#65039; <strong>{}</strong></div>"#,
                class,
                text(&w.message)
            )
        }
        None => String::new(),
    };

    let metrics: String = display
        .metric_bars
        .iter()
        .map(|bar| {
            format!(
                r#"<div class="metric">
                    <div class="metric-head"><span>{}</span><span class="mono">{}</span></div>
                    <div class="metric-track"><div class="metric-bar" style="width: {}%"></div></div>
                </div>"#,
                bar.label,
                text(&bar.value_text),
                bar.bar_width
            )
        })
        .collect();

    let sentences: String = display
        .sentence_highlights
        .iter()
        .map(|h| {
            format!(
                r#"<span class="sentence" style="background-color: {}" title="{}">{} </span>"#,
                h.background_color,
                attr(&h.tooltip),
                text(&h.text)
            )
        })
        .collect();

    format!(
        r#"<section class="results" id="resultsSection">
            {warning}
            <div class="card score-card">
                <svg class="score-ring" width="{size}" height="{size}" viewBox="0 0 {size} {size}">
                    <defs>
                        <linearGradient id="scoreGradient">
                            <stop offset="0%" stop-color="{grad_from}"/>
                            <stop offset="100%" stop-color="{grad_to}"/>
                        </linearGradient>
                    </defs>
                    <circle class="score-ring-bg" cx="{center}" cy="{center}" r="{radius}"/>
                    <circle class="score-ring-fill" id="scoreRingFill" cx="{center}" cy="{center}" r="{radius}"
                        stroke="url(#scoreGradient)" stroke-dasharray="{circumference}" stroke-dashoffset="{offset}"
                        transform="rotate(-90 {center} {center})"/>
                    <text x="50%" y="50%" class="score-value" id="scoreValue">{score}</text>
                </svg>
                <div class="score-text">
                    <div class="score-label" id="scoreLabel" style="color: {label_color}">{label}</div>
                    <p class="score-explanation">{explanation}</p>
                    <div class="score-confidence">Confidence: {confidence}</div>
                    <p class="score-explanation">{confidence_explanation}</p>
                </div>
            </div>
            <div class="card">
                <div class="card-header">Metrics</div>
                <div class="metrics">{metrics}</div>
            </div>
            <div class="card">
                <div class="card-header">Sentence analysis</div>
                <div class="highlighted-text" id="highlightedText">{sentences}</div>
            </div>
        </section>"#,
        warning = warning,
        size = size,
        center = center,
        radius = radius,
        grad_from = display.gradient.from,
        grad_to = display.gradient.to,
        circumference = display.ring_circumference,
        offset = display.ring_offset,
        score = display.score_text,
        label_color = display.label_color,
        label = text(&display.label),
        explanation = display.explanation,
        confidence = text(&display.confidence),
        confidence_explanation = display.confidence_explanation,
        metrics = metrics,
        sentences = sentences,
    )
}

const STYLE: &str = r#"
        *, *::before, *::after { margin: 0; padding: 0; box-sizing: border-box; }
        :root {
            --bg: #ffffff; --bg-secondary: #f7f8fa; --border: #d8dce3; --border-light: #e8ebf0;
            --text-primary: #111827; --text-secondary: #4b5563; --text-tertiary: #9ca3af;
            --success: #10b981; --warning: #f59e0b; --danger: #ef4444; --accent: #667eea;
            --mono: 'SF Mono', 'Fira Code', 'JetBrains Mono', Menlo, monospace;
        }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Inter', system-ui, sans-serif;
            background: var(--bg); color: var(--text-primary); min-height: 100vh;
        }
        .page { max-width: 760px; margin: 0 auto; padding: 3rem 1.25rem 4rem; }
        .page-header { display: flex; align-items: center; justify-content: space-between; margin-bottom: 1.5rem; }
        .wordmark { font-size: 1rem; font-weight: 600; color: var(--text-primary); text-decoration: none; }
        .wordmark span { color: var(--text-tertiary); font-weight: 400; }
        .status-badge {
            display: inline-flex; align-items: center; gap: 0.375rem; padding: 0.25rem 0.625rem;
            border-radius: 9999px; font-size: 0.75rem; font-weight: 500; border: 1px solid var(--border);
        }
        .status-badge.success { background: rgba(16, 185, 129, 0.1); border-color: rgba(16, 185, 129, 0.3); color: var(--success); }
        .status-badge.warning { background: rgba(245, 158, 11, 0.1); border-color: rgba(245, 158, 11, 0.3); color: var(--warning); }
        .status-badge.danger { background: rgba(239, 68, 68, 0.1); border-color: rgba(239, 68, 68, 0.3); color: var(--danger); }
        .status-dot { width: 5px; height: 5px; border-radius: 50%; background: currentColor; }
        .card { border: 1px solid var(--border); border-radius: 8px; margin-bottom: 1rem; overflow: hidden; }
        .card-header {
            font-size: 0.6875rem; font-weight: 600; text-transform: uppercase; letter-spacing: 0.05em;
            color: var(--text-tertiary); padding: 0.75rem 1rem 0.5rem; background: var(--bg-secondary);
            border-bottom: 1px solid var(--border-light);
        }
        .input-card textarea {
            width: 100%; min-height: 220px; border: none; padding: 1rem; font: inherit; resize: vertical;
        }
        .input-footer {
            display: flex; justify-content: space-between; align-items: center; padding: 0.625rem 1rem;
            border-top: 1px solid var(--border-light); background: var(--bg-secondary);
        }
        .char-count { font-size: 0.75rem; color: var(--text-tertiary); }
        button {
            padding: 0.5rem 1rem; border: none; border-radius: 6px; background: var(--accent); color: #fff;
            font-weight: 500; cursor: pointer;
        }
        button:disabled { opacity: 0.5; cursor: not-allowed; }
        .notice { padding: 0.75rem 1rem; border: 1px solid; border-radius: 8px; margin-bottom: 1rem; font-size: 0.875rem; }
        .notice-danger { background: rgba(239, 68, 68, 0.1); border-color: rgba(239, 68, 68, 0.2); color: var(--danger); }
        .notice-warning { background: rgba(245, 158, 11, 0.1); border-color: rgba(245, 158, 11, 0.2); color: var(--warning); }
        .score-card { display: flex; gap: 1.5rem; align-items: center; padding: 1.25rem; }
        .score-ring-bg { fill: none; stroke: var(--border-light); stroke-width: 10; }
        .score-ring-fill { fill: none; stroke-width: 10; stroke-linecap: round; transition: stroke-dashoffset 0.6s; }
        .score-value { font-size: 2rem; font-weight: 700; text-anchor: middle; dominant-baseline: middle; }
        .score-label { font-size: 1.375rem; font-weight: 600; }
        .score-explanation { color: var(--text-secondary); font-size: 0.8125rem; margin: 0.25rem 0 0.5rem; }
        .score-confidence { color: var(--text-tertiary); font-size: 0.8125rem; }
        .metrics { padding: 0.75rem 1rem; display: grid; gap: 0.75rem; }
        .metric-head { display: flex; justify-content: space-between; font-size: 0.8125rem; margin-bottom: 0.25rem; }
        .metric-track { height: 6px; background: var(--border-light); border-radius: 3px; overflow: hidden; }
        .metric-bar { height: 100%; background: linear-gradient(90deg, #667eea, #764ba2); }
        .mono { font-family: var(--mono); font-size: 0.75rem; }
        .highlighted-text { padding: 1rem; line-height: 1.8; font-size: 0.9375rem; }
        .sentence { border-radius: 3px; padding: 0.1rem 0; }
        .loading-overlay {
            display: none; position: fixed; inset: 0; background: rgba(255, 255, 255, 0.7);
            align-items: center; justify-content: center;
        }
        .spinner {
            width: 32px; height: 32px; border: 3px solid var(--border); border-top-color: var(--accent);
            border-radius: 50%; animation: spin 0.8s linear infinite;
        }
        @keyframes spin { to { transform: rotate(360deg); } }
        .cookie-banner {
            position: fixed; left: 1rem; right: 1rem; bottom: 1rem; display: flex; gap: 1rem;
            align-items: center; justify-content: space-between; padding: 0.875rem 1rem;
            background: #111827; color: #fff; border-radius: 8px; font-size: 0.8125rem;
        }
"#;

// Live counter and submit state. The server repeats every check, so this is
// presentation only.
const SCRIPT: &str = r#"
(function () {
    var input = document.getElementById('textInput');
    var counter = document.getElementById('charCount');
    var button = document.getElementById('analyzeBtn');
    var form = document.getElementById('checkForm');
    var overlay = document.getElementById('loadingOverlay');
    var badge = document.getElementById('statusBadge');
    var busy = false;
    function update() {
        var length = Array.from(input.value).length;
        counter.textContent = length.toLocaleString('en-US') + ' / 10,000';
        button.disabled = busy || length < 10;
    }
    input.addEventListener('input', update);
    form.addEventListener('submit', function () {
        busy = true;
        update();
        overlay.style.display = 'flex';
        badge.className = 'status-badge warning';
        badge.lastElementChild.textContent = 'Analyzing...';
    });
    update();
})();
"#;
