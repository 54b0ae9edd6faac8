use axum::{
    http::header,
    response::{Html, IntoResponse},
};

pub async fn dashboard() -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, "public, max-age=60")],
        Html(DASHBOARD_HTML),
    )
}

const DASHBOARD_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Hydro 3.0 - Flow Monitoring</title>
    <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/uplot@1.6.31/dist/uPlot.min.css">
    <style>
        :root {
            --bg: #f8fafc;
            --surface: #ffffff;
            --border: #e2e8f0;
            --text: #1e293b;
            --muted: #64748b;
            --accent: #1d4ed8;
        }
        * { box-sizing: border-box; margin: 0; padding: 0; }
        body { font-family: system-ui, -apple-system, sans-serif; background: var(--bg); color: var(--text); min-height: 100vh; }

        .container { max-width: 1100px; margin: 0 auto; padding: 1.5rem; }

        header {
            display: flex;
            justify-content: space-between;
            align-items: center;
            margin-bottom: 1rem;
            flex-wrap: wrap;
            gap: 1rem;
        }
        h1 { font-size: 1.25rem; font-weight: 600; }

        .btn-row { display: flex; gap: 0.5rem; flex-wrap: wrap; }
        .btn {
            padding: 0.4rem 0.9rem;
            border: 1px solid var(--border);
            border-radius: 0.375rem;
            font-size: 0.85rem;
            background: var(--surface);
            cursor: pointer;
            transition: all 0.15s;
        }
        .btn:hover { border-color: var(--accent); color: var(--accent); }
        .btn.active { background: var(--accent); border-color: var(--accent); color: white; }

        .chart-card {
            background: var(--surface);
            border: 1px solid var(--border);
            border-radius: 0.5rem;
            padding: 1rem;
            margin-bottom: 1rem;
            position: relative;
        }
        .chart-card h2 { font-size: 0.85rem; font-weight: 600; color: var(--muted); margin-bottom: 0.75rem; }
        .chart-card .meta { font-size: 0.7rem; color: var(--muted); margin-top: 0.5rem; }
        .chart-card.is-loading::after {
            content: 'Loading...';
            position: absolute;
            inset: 0;
            display: flex;
            align-items: center;
            justify-content: center;
            background: rgba(255,255,255,0.7);
            color: var(--muted);
            font-size: 0.85rem;
            border-radius: 0.5rem;
        }
        .placeholder { color: var(--muted); font-size: 0.85rem; padding: 2rem 0; text-align: center; }
        .site-footer { font-size: 0.7rem; color: #999; opacity: 0.5; padding-top: 0.5rem; }
        .site-footer a { color: inherit; }
    </style>
</head>
<body>
    <div class="container">
        <header>
            <h1>Hydro 3.0 - Flow Monitoring</h1>
            <div class="btn-row" id="station-buttons"><span class="placeholder">Loading stations...</span></div>
        </header>

        <div class="btn-row" id="range-buttons" style="margin-bottom: 1rem;"></div>

        <div class="chart-card" id="card-flow">
            <h2>Flow rate (l/s)</h2>
            <div id="chart-flow" class="placeholder">Select a station</div>
            <div class="meta" id="flow-meta"></div>
        </div>

        <div class="chart-card" id="card-histogram">
            <h2>Normalized flow distribution (%)</h2>
            <div id="chart-histogram" class="placeholder"></div>
        </div>

        <div class="chart-card" id="card-duration">
            <h2>Flow-duration curve</h2>
            <div id="chart-duration" class="placeholder"></div>
            <div class="meta" id="duration-meta"></div>
        </div>

        <footer class="site-footer">
            <a href="/docs">API Docs</a>
        </footer>
    </div>

    <script src="https://cdn.jsdelivr.net/npm/uplot@1.6.31/dist/uPlot.iife.min.js"></script>
<script>
const api = url => fetch(url).then(r => {
    if (!r.ok) throw new Error('API error');
    return r.json();
});

const RANGES = ['24h', '7d', '1m', '6m', '1y', 'all'];
const REFRESH_MS = 300000;

const state = {
    station: null,
    range: '24h',
    charts: {},
    timer: null,
};

function setActive(containerId, value, attr) {
    document.querySelectorAll(`#${containerId} .btn`).forEach(btn => {
        btn.classList.toggle('active', btn.getAttribute(attr) === value);
    });
}

function setLoading(cardId, isLoading) {
    document.getElementById(cardId).classList.toggle('is-loading', isLoading);
}

function destroyChart(key) {
    if (state.charts[key]) {
        state.charts[key].destroy();
        delete state.charts[key];
    }
}

function mountChart(key, elId, opts, data) {
    destroyChart(key);
    const el = document.getElementById(elId);
    el.classList.remove('placeholder');
    el.textContent = '';
    opts.width = el.clientWidth || 1000;
    state.charts[key] = new uPlot(opts, data, el);
}

function fmtTime(ts) {
    const d = new Date(ts);
    return d.toLocaleString('en-GB', { day: '2-digit', month: '2-digit', year: '2-digit',
        hour: '2-digit', minute: '2-digit' });
}

async function loadFlow() {
    setLoading('card-flow', true);
    try {
        const data = await api(`/api/stations/${state.station.id}/flow?range=${state.range}`);
        // Points arrive as {x, y} with y=null at sentinel breaks
        const xs = data.smoothed.map(p => p.x / 1000);
        const smoothed = data.smoothed.map(p => p.y);
        const rawByX = new Map(data.raw.map(p => [p.x, p.y]));
        const raw = data.smoothed.map(p => rawByX.get(p.x) ?? null);
        const avg = data.average != null ? data.smoothed.map(() => data.average) : null;

        const series = [
            {},
            { label: 'Raw', stroke: '#6b7280', width: 1, spanGaps: false },
            { label: 'Smoothed', stroke: '#2563eb', width: 1.5, spanGaps: false },
        ];
        const seriesData = [xs, raw, smoothed];
        if (avg) {
            series.push({ label: 'Average', stroke: '#dc2626', dash: [6, 6], width: 1 });
            seriesData.push(avg);
        }

        mountChart('flow', 'chart-flow', {
            height: 260,
            scales: { x: { time: true }, y: { range: (u, min, max) =>
                [0, data.suggested_max != null ? data.suggested_max : max] } },
            series,
            // Shade outage intervals behind the series
            hooks: {
                drawClear: [u => {
                    const { ctx } = u;
                    ctx.save();
                    ctx.fillStyle = 'rgba(100, 116, 139, 0.12)';
                    (data.gaps || []).forEach(g => {
                        const x0 = u.valToPos(g.start / 1000, 'x', true);
                        const x1 = u.valToPos(g.end / 1000, 'x', true);
                        ctx.fillRect(x0, u.bbox.top, x1 - x0, u.bbox.height);
                    });
                    ctx.restore();
                }],
            },
        }, seriesData);

        const meta = [];
        if (data.start_ms != null && data.end_ms != null) {
            meta.push(`${fmtTime(data.start_ms)} -> ${fmtTime(data.end_ms)} (${data.range})`);
        }
        meta.push(`${data.point_count} points${data.thinned ? ' (thinned)' : ''}`);
        meta.push(`${data.gaps.length} gaps, ${data.outliers.length} outliers`);
        document.getElementById('flow-meta').textContent = meta.join(' | ');
    } catch (e) {
        // keep previous chart if the refresh fails
    } finally {
        setLoading('card-flow', false);
    }
}

async function loadHistogram() {
    setLoading('card-histogram', true);
    try {
        const data = await api(`/api/stations/${state.station.id}/histogram`);
        const xs = data.percent_points.map(p => p.x);
        const ys = data.percent_points.map(p => p.y);

        mountChart('histogram', 'chart-histogram', {
            height: 200,
            scales: { x: { time: false }, y: { auto: true } },
            series: [
                {},
                { label: '% of readings', stroke: '#16a34a', fill: 'rgba(22, 163, 74, 0.18)',
                  paths: uPlot.paths.bars ? uPlot.paths.bars({ size: [0.8] }) : undefined },
            ],
        }, [xs, ys]);
    } catch (e) {
        // keep previous chart if the refresh fails
    } finally {
        setLoading('card-histogram', false);
    }
}

async function loadDurationCurve() {
    setLoading('card-duration', true);
    try {
        const data = await api(`/api/stations/${state.station.id}/duration-curve`);
        const xs = data.points.map(p => p.x);
        const ys = data.points.map(p => p.y);

        mountChart('duration', 'chart-duration', {
            height: 200,
            scales: { x: { time: false }, y: { auto: true } },
            series: [
                { label: '% time exceeded', value: (u, v) => v == null ? '--' : v.toFixed(1) + '%' },
                { label: 'Flow (l/s)', stroke: '#f59e0b', width: 2 },
            ],
        }, [xs, ys]);

        document.getElementById('duration-meta').textContent =
            data.reference_flow != null
                ? `Q at ${data.reference_percent}% exceedance: ${data.reference_flow.toFixed(1)} l/s`
                : '';
    } catch (e) {
        // keep previous chart if the refresh fails
    } finally {
        setLoading('card-duration', false);
    }
}

function refreshAll() {
    if (!state.station) return;
    loadFlow();
    loadHistogram();
    loadDurationCurve();
}

function selectStation(station) {
    state.station = station;
    setActive('station-buttons', station.id, 'data-id');
    refreshAll();
}

function selectRange(rangeKey) {
    state.range = rangeKey;
    setActive('range-buttons', rangeKey, 'data-range');
    loadFlow();
}

async function init() {
    const rangeRow = document.getElementById('range-buttons');
    rangeRow.innerHTML = RANGES.map(r =>
        `<button class="btn" data-range="${r}">${r}</button>`).join('');
    rangeRow.querySelectorAll('.btn').forEach(btn => {
        btn.addEventListener('click', () => selectRange(btn.getAttribute('data-range')));
    });
    setActive('range-buttons', state.range, 'data-range');

    const stations = await api('/api/stations');
    const row = document.getElementById('station-buttons');
    row.innerHTML = stations.map(s =>
        `<button class="btn" data-id="${s.id}">${s.name}</button>`).join('');
    row.querySelectorAll('.btn').forEach(btn => {
        btn.addEventListener('click', () => {
            selectStation(stations.find(s => s.id === btn.getAttribute('data-id')));
        });
    });

    const first = stations.find(s => s.is_active) || stations[0];
    if (first) selectStation(first);

    state.timer = setInterval(refreshAll, REFRESH_MS);
}

window.addEventListener('resize', () => {
    Object.values(state.charts).forEach(chart => {
        const width = chart.root.parentElement.clientWidth;
        chart.setSize({ width, height: chart.height });
    });
});

init();
</script>
</body>
</html>
"##;
