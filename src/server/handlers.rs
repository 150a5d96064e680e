//! HTTP request handlers

use std::sync::Arc;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Html,
    Json,
};
use serde_json::json;
use tracing::info;

use crate::dashboard::{ChartData, ChartKind, EmployeeProfile, FormOptions, Kpis, Prediction};

use super::error::{Result, ServerError};
use super::state::AppState;

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.context.pipeline().model_type(),
        "uptime_secs": state.uptime_secs(),
    }))
}

pub async fn get_kpis(State(state): State<Arc<AppState>>) -> Json<Kpis> {
    Json(state.context.kpis().clone())
}

pub async fn get_options(State(state): State<Arc<AppState>>) -> Json<FormOptions> {
    Json(state.context.options().clone())
}

pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<EmployeeProfile>, JsonRejection>,
) -> Result<Json<Prediction>> {
    let Json(profile) = payload.map_err(|e| ServerError::BadRequest(e.body_text()))?;

    // CPU-bound: forest inference fans out to rayon
    let worker = Arc::clone(&state);
    let (profile, prediction) = tokio::task::spawn_blocking(move || {
        let prediction = worker.context.predict(&profile);
        (profile, prediction)
    })
    .await
    .map_err(|e| ServerError::Internal(format!("Prediction task failed: {}", e)))?;
    let prediction = prediction?;

    info!(
        department = %profile.department,
        job_role = %profile.job_role,
        probability = prediction.probability,
        risk = ?prediction.risk,
        "Scored profile"
    );
    Ok(Json(prediction))
}

pub async fn list_charts() -> Json<serde_json::Value> {
    let charts: Vec<_> = ChartKind::ALL
        .iter()
        .map(|k| json!({ "name": k.slug(), "title": k.title() }))
        .collect();
    Json(json!({ "charts": charts }))
}

pub async fn get_chart(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<ChartData>> {
    let kind = ChartKind::from_slug(&name)
        .ok_or_else(|| ServerError::NotFound(format!("Unknown chart: {}", name)))?;
    Ok(Json(state.context.chart(kind)?))
}

pub async fn get_model(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let pipeline = state.context.pipeline();
    Json(json!({
        "model": pipeline.model_type(),
        "model_name": pipeline.model_type().name(),
        "feature_names": pipeline.feature_names(),
        "report": state.context.training_report(),
    }))
}

// ============================================================================
// UI Handler
// ============================================================================

pub async fn serve_index() -> Html<&'static str> {
    Html(EMBEDDED_INDEX_HTML)
}

const EMBEDDED_INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Employee Attrition Analysis</title>
    <script defer src="https://cdn.jsdelivr.net/npm/alpinejs@3.x.x/dist/cdn.min.js"></script>
    <script src="https://cdn.tailwindcss.com"></script>
    <style>[x-cloak]{display:none!important}.tab-active{background-color:rgb(44 62 80);color:white}</style>
</head>
<body class="bg-gray-50 text-gray-800 min-h-screen" x-data="app()" x-init="init()">
    <header class="bg-white border-b px-6 py-4">
        <h1 class="text-xl font-bold text-slate-700">Employee Attrition Analysis - HR Dashboard</h1>
    </header>
    <nav class="bg-white px-6 py-2 border-b">
        <div class="flex space-x-1">
            <button @click="tab='overview'" :class="tab==='overview'?'tab-active':'hover:bg-gray-100'" class="px-4 py-2 rounded-md text-sm">HR Overview</button>
            <button @click="tab='predict'" :class="tab==='predict'?'tab-active':'hover:bg-gray-100'" class="px-4 py-2 rounded-md text-sm">Prediction</button>
            <button @click="tab='analytics'" :class="tab==='analytics'?'tab-active':'hover:bg-gray-100'" class="px-4 py-2 rounded-md text-sm">HR Analytics</button>
        </div>
    </nav>
    <main class="p-6">
        <div x-show="tab==='overview'" x-cloak>
            <div class="grid grid-cols-4 gap-4">
                <div class="bg-white rounded-lg p-4 shadow"><div class="text-sm text-gray-500">Total Employees</div><div class="text-2xl font-bold" x-text="kpis.total_employees"></div></div>
                <div class="bg-white rounded-lg p-4 shadow"><div class="text-sm text-gray-500">Attrition Count</div><div class="text-2xl font-bold" x-text="kpis.attrition_count"></div></div>
                <div class="bg-white rounded-lg p-4 shadow"><div class="text-sm text-gray-500">Attrition Rate (%)</div><div class="text-2xl font-bold" x-text="fmt(kpis.attrition_rate, 2)"></div></div>
                <div class="bg-white rounded-lg p-4 shadow"><div class="text-sm text-gray-500">Avg Tenure (Years)</div><div class="text-2xl font-bold" x-text="fmt(kpis.avg_years_at_company, 1)"></div></div>
            </div>
        </div>

        <div x-show="tab==='predict'" x-cloak class="grid grid-cols-2 gap-6">
            <div class="bg-white rounded-lg p-6 shadow space-y-3">
                <template x-for="r in options.numeric" :key="r.field">
                    <label class="block text-sm">
                        <span x-text="r.field + ' (' + r.min + '-' + r.max + ')'"></span>
                        <input type="number" class="w-full border rounded px-2 py-1" :min="r.min" :max="r.max" x-model.number="profile[r.field]">
                    </label>
                </template>
                <template x-for="c in options.categorical" :key="c[0]">
                    <label class="block text-sm">
                        <span x-text="c[0]"></span>
                        <select class="w-full border rounded px-2 py-1" x-model="profile[c[0]]">
                            <template x-for="v in c[1]" :key="v"><option :value="v" x-text="v"></option></template>
                        </select>
                    </label>
                </template>
                <button @click="predict()" class="px-4 py-2 bg-slate-700 text-white rounded">Predict Attrition</button>
            </div>
            <div class="bg-white rounded-lg p-6 shadow" x-show="result || error">
                <template x-if="error"><div class="text-red-600" x-text="error"></div></template>
                <template x-if="result">
                    <div>
                        <h2 class="text-lg font-semibold mb-2">Prediction Result</h2>
                        <div class="w-full bg-gray-200 rounded h-3"><div class="bg-slate-700 h-3 rounded" :style="'width:' + (result.probability * 100) + '%'"></div></div>
                        <p class="mt-2">Attrition Probability: <code x-text="fmt(result.probability, 2)"></code></p>
                        <p class="mt-2 font-semibold" :class="{'text-green-600': result.risk==='Low', 'text-yellow-600': result.risk==='Medium', 'text-red-600': result.risk==='High'}" x-text="result.risk + ' Attrition Risk'"></p>
                    </div>
                </template>
            </div>
        </div>

        <div x-show="tab==='analytics'" x-cloak class="grid grid-cols-2 gap-6">
            <template x-for="chart in charts" :key="chart.title">
                <div class="bg-white rounded-lg p-4 shadow">
                    <h3 class="font-semibold mb-3" x-text="chart.title"></h3>
                    <template x-if="chart.kind==='counts'">
                        <div class="space-y-1 text-sm">
                            <template x-for="g in chart.groups" :key="g.category">
                                <div class="flex items-center gap-2">
                                    <span class="w-40 truncate" x-text="g.category"></span>
                                    <div class="bg-sky-600 h-3" :style="'width:' + bar(chart, g.stayed) + 'px'"></div><span x-text="g.stayed"></span>
                                    <div class="bg-orange-500 h-3" :style="'width:' + bar(chart, g.left) + 'px'"></div><span x-text="g.left"></span>
                                </div>
                            </template>
                        </div>
                    </template>
                    <template x-if="chart.kind==='box'">
                        <table class="text-sm w-full">
                            <tr class="text-gray-500"><td>Attrition</td><td>min</td><td>q1</td><td>median</td><td>q3</td><td>max</td></tr>
                            <template x-for="row in [['0', chart.distribution.stayed], ['1', chart.distribution.left]]" :key="row[0]">
                                <tr x-show="row[1]"><td x-text="row[0]"></td><td x-text="row[1] && fmt(row[1].min, 0)"></td><td x-text="row[1] && fmt(row[1].q1, 0)"></td><td x-text="row[1] && fmt(row[1].median, 0)"></td><td x-text="row[1] && fmt(row[1].q3, 0)"></td><td x-text="row[1] && fmt(row[1].max, 0)"></td></tr>
                            </template>
                        </table>
                    </template>
                </div>
            </template>
        </div>
    </main>
    <footer class="px-6 py-4 text-xs text-gray-500">Employee Attrition Analysis | HR Analytics Dashboard</footer>
    <script>
    function app() {
        return {
            tab: 'overview', kpis: {}, options: {numeric: [], categorical: []}, profile: {}, charts: [], result: null, error: null,
            async init() {
                this.kpis = await (await fetch('/api/kpis')).json();
                this.options = await (await fetch('/api/options')).json();
                this.options.numeric.forEach(r => this.profile[r.field] = r.default);
                this.options.categorical.forEach(c => this.profile[c[0]] = c[1][0]);
                for (const name of ['department', 'job-role', 'age', 'income']) {
                    this.charts.push(await (await fetch('/api/charts/' + name)).json());
                }
            },
            async predict() {
                this.error = null; this.result = null;
                const res = await fetch('/api/predict', {method: 'POST', headers: {'Content-Type': 'application/json'}, body: JSON.stringify(this.profile)});
                const body = await res.json();
                if (res.ok) { this.result = body; } else { this.error = body.message; }
            },
            bar(chart, n) {
                const max = Math.max(...chart.groups.map(g => Math.max(g.stayed, g.left)), 1);
                return Math.round(n / max * 160);
            },
            fmt(v, d) { return v === undefined ? '' : Number(v).toFixed(d); },
        };
    }
    </script>
</body>
</html>
"#;
