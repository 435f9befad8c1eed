//! # zbxsend-app
//!
//! zbxsend 바이너리 진입점.
//! CLI 인자 → 설정 해석, 어댑터 생성(DI), 전송 결과 출력과 종료 코드 결정.

mod input;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;
use zbxsend_core::agent_config;
use zbxsend_core::config::SenderConfig;
use zbxsend_core::models::endpoint::{Endpoint, DEFAULT_TRAPPER_PORT};
use zbxsend_core::models::metric::Metric;
use zbxsend_core::models::response::AggregateResult;
use zbxsend_network::observer::TracingObserver;
use zbxsend_network::sender::ZabbixSender;

use crate::input::{parse_input, InputFormat};

/// 서버 측 실패 아이템이 있을 때
const EXIT_ITEMS_FAILED: u8 = 1;
/// 설정/입력/네트워크/프로토콜 에러
const EXIT_ERROR: u8 = 2;

/// Zabbix trapper 전송기
///
/// 메트릭을 Zabbix 서버/프록시의 trapper 포트로 전송한다
#[derive(Parser, Debug)]
#[command(name = "zbxsend")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 서버 주소 host[:port] (여러 번 지정 가능, 지정 순서대로 전송)
    #[arg(long, short = 'z')]
    server: Vec<String>,

    /// 포트가 없는 서버 주소에 사용할 포트
    #[arg(long, short = 'p', default_value_t = DEFAULT_TRAPPER_PORT)]
    port: u16,

    /// Zabbix 에이전트 설정 파일 (ServerActive 사용)
    #[arg(long, short = 'c', conflicts_with = "use_agent_config")]
    config: Option<PathBuf>,

    /// 잘 알려진 경로에서 에이전트 설정 파일 탐색
    #[arg(long)]
    use_agent_config: bool,

    /// 전송기 설정 JSON 파일
    #[arg(long)]
    sender_config: Option<PathBuf>,

    /// 호스트명 (입력 파일의 '-' 호스트에도 사용)
    #[arg(long, short = 's')]
    host: Option<String>,

    /// 아이템 키
    #[arg(long, short = 'k', requires = "value")]
    key: Option<String>,

    /// 값
    #[arg(long, short = 'o', requires = "key")]
    value: Option<String>,

    /// Unix 타임스탬프 (단일 값 전송 시)
    #[arg(long, requires = "key")]
    clock: Option<String>,

    /// 입력 파일 ('-'는 표준 입력)
    #[arg(long, short = 'i', conflicts_with = "key")]
    input_file: Option<String>,

    /// 입력 파일 각 줄에 clock 필드 포함
    #[arg(long, short = 'T', requires = "input_file")]
    with_timestamps: bool,

    /// 청크당 최대 메트릭 수 (기본: 250)
    #[arg(long)]
    chunk_size: Option<usize>,

    /// connect/write/read 타임아웃 밀리초 (기본: 10000)
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "info")]
    log_level: String,

    /// 결과를 JSON으로 출력
    #[arg(long)]
    json: bool,
}

/// CLI 인자로 전송기 설정 해석
///
/// 엔드포인트 우선순위: `--server` > `--config`/`--use-agent-config` > `--sender-config` > 기본값
fn resolve_config(args: &Args) -> Result<SenderConfig> {
    let mut config = match &args.sender_config {
        Some(path) => SenderConfig::load_from_file(path)?,
        None => SenderConfig::default_config(),
    };

    if !args.server.is_empty() {
        config.endpoints = args
            .server
            .iter()
            .map(|s| Endpoint::parse_with_default_port(s, args.port))
            .collect::<Result<_, _>>()?;
    } else if let Some(path) = &args.config {
        config.endpoints = agent_config::load_endpoints(path)?;
    } else if args.use_agent_config {
        let path = agent_config::discover_agent_config()
            .ok_or_else(|| anyhow!("에이전트 설정 파일을 찾을 수 없음"))?;
        config.endpoints = agent_config::load_endpoints(&path)?;
    }

    if let Some(chunk_size) = args.chunk_size {
        config.chunk_size = chunk_size;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.timeout_ms = timeout_ms;
    }

    config.validate()?;
    Ok(config)
}

/// 전송할 메트릭 수집 (단일 값 또는 입력 파일)
fn collect_metrics(args: &Args) -> Result<Vec<Metric>> {
    if let Some(path) = &args.input_file {
        let format = InputFormat {
            default_host: args.host.as_deref(),
            with_timestamps: args.with_timestamps,
        };
        return if path == "-" {
            parse_input(io::stdin().lock(), format)
        } else {
            let file = File::open(path).with_context(|| format!("입력 파일 열기 실패: {path}"))?;
            parse_input(BufReader::new(file), format)
        };
    }

    let (Some(key), Some(value)) = (&args.key, &args.value) else {
        bail!("--key/--value 또는 --input-file 중 하나가 필요함");
    };
    let host = args
        .host
        .as_deref()
        .ok_or_else(|| anyhow!("단일 값 전송에는 --host가 필요함"))?;

    let metric = Metric::new(host, key.as_str(), value);
    let metric = match &args.clock {
        Some(clock) => metric.with_clock_str(clock)?,
        None => metric,
    };
    Ok(vec![metric])
}

/// 요약 출력 (기본: 서버 info 형식, `--json`: JSON)
fn render_summary(result: &AggregateResult, json: bool) -> String {
    if json {
        result.to_string()
    } else {
        format!(
            "processed: {}; failed: {}; total: {}; seconds spent: {}; chunks: {}",
            result.processed, result.failed, result.total, result.time, result.chunk_count
        )
    }
}

async fn run(args: &Args) -> Result<AggregateResult> {
    let config = resolve_config(args)?;
    let metrics = collect_metrics(args)?;
    info!(
        endpoints = ?config.endpoints,
        chunk_size = config.chunk_size,
        metrics = metrics.len(),
        "전송 시작"
    );

    // ── 어댑터 생성 (DI 와이어링) ──
    let sender =
        ZabbixSender::from_config(&config)?.with_observer(Arc::new(TracingObserver::new()));

    let result = sender.send(&metrics).await?;
    debug!(%result, "전송 결과");
    Ok(result)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // tracing 초기화 (stdout은 결과 출력 전용)
    let log_filter = format!(
        "zbxsend={},zbxsend_core={},zbxsend_network={}",
        args.log_level, args.log_level, args.log_level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .with_writer(io::stderr)
        .init();

    match run(&args).await {
        Ok(result) => {
            println!("{}", render_summary(&result, args.json));
            if result.has_failures() {
                ExitCode::from(EXIT_ITEMS_FAILED)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!("전송 실패: {e:#}");
            eprintln!("zbxsend: {e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}
