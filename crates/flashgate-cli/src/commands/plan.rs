use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;

use crate::error::{CliError, Result};
use crate::style::Theme;
use crate::OutputFormat;
use flashgate_core::{
    AcceleratorInfo, AttentionShape, LaunchConfig, LaunchPlan, MetadataKv, TracingObserver,
};

pub struct PlanArgs {
    pub metadata: PathBuf,
    pub gpus: Vec<AcceleratorInfo>,
    pub flash_attn: Option<bool>,
    pub kv_cache_type: Option<String>,
    pub base_params: Vec<String>,
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct PlanReport<'a> {
    accelerators: &'a [AcceleratorInfo],
    #[serde(flatten)]
    plan: &'a LaunchPlan,
}

/// CLI flags win over the file and environment; base params are appended to
/// the configured ones.
pub fn resolve_config(mut config: LaunchConfig, args: &PlanArgs) -> LaunchConfig {
    if let Some(flash_attn) = args.flash_attn {
        config.flash_attention = flash_attn;
    }
    if let Some(ref kv_cache_type) = args.kv_cache_type {
        config.kv_cache_type = kv_cache_type.trim().to_string();
    }
    config.base_params.extend(args.base_params.iter().cloned());
    config
}

pub fn execute(args: PlanArgs, config: LaunchConfig, theme: &Theme) -> Result<()> {
    let metadata = MetadataKv::from_path(&args.metadata).map_err(CliError::Metadata)?;
    let config = resolve_config(config, &args);

    let plan = LaunchPlan::build(&metadata, &args.gpus, &config, &TracingObserver);

    match args.format {
        OutputFormat::Json => {
            let report = PlanReport {
                accelerators: &args.gpus,
                plan: &plan,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Plain => {
            println!("{}", plan.params.join(" "));
        }
        OutputFormat::Table => {
            print!("{}", render_plan(&plan, &args.gpus, &config, theme));
        }
    }

    Ok(())
}

fn describe_attention(shape: &AttentionShape) -> String {
    match shape {
        AttentionShape::Compatible { head_count } => format!("K = V = {head_count}"),
        AttentionShape::MissingHeadCount { k, v } => {
            format!("missing head count (K = {k}, V = {v})")
        }
        AttentionShape::HeadCountMismatch { k, v } => format!("K ({k}) differs from V ({v})"),
    }
}

pub fn render_plan(
    plan: &LaunchPlan,
    gpus: &[AcceleratorInfo],
    config: &LaunchConfig,
    theme: &Theme,
) -> String {
    let mut out = String::new();
    let support = &plan.flash_attention;

    let architecture = if plan.model.architecture.is_empty() {
        "unknown"
    } else {
        plan.model.architecture.as_str()
    };
    let accelerators = if gpus.is_empty() {
        "none".to_string()
    } else {
        gpus.iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    let requested_cache = if config.kv_cache_type.is_empty() {
        "default"
    } else {
        config.kv_cache_type.as_str()
    };
    let chosen_cache = plan
        .kv_cache_type
        .map(|cache_type| cache_type.to_string())
        .unwrap_or_else(|| "default".to_string());

    let _ = writeln!(out, "{}", (theme.bold)("Model:"));
    let _ = writeln!(out, "  Architecture:   {}", (theme.accent)(architecture));
    let _ = writeln!(
        out,
        "  Attention:      {}",
        describe_attention(&plan.model.attention)
    );
    let _ = writeln!(out, "  Embedding:      {}", theme.flag(support.is_embedding_model));
    let _ = writeln!(out, "  Accelerators:   {}", accelerators);

    let _ = writeln!(out, "\n{}", (theme.bold)("Flash attention:"));
    let _ = writeln!(out, "  Requested:      {}", theme.flag(config.flash_attention));
    let _ = writeln!(out, "  Model support:  {}", theme.flag(support.supported_by_model));
    let _ = writeln!(
        out,
        "  Hardware:       {}",
        theme.flag(support.supported_by_hardware)
    );
    let _ = writeln!(out, "  Enabled:        {}", theme.flag(support.enabled));

    let _ = writeln!(out, "\n{}", (theme.bold)("KV cache:"));
    let _ = writeln!(out, "  Requested:      {}", requested_cache);
    let _ = writeln!(out, "  Using:          {}", chosen_cache);

    let _ = writeln!(out, "\n{}", (theme.bold)("Launch parameters:"));
    if plan.params.is_empty() {
        let _ = writeln!(out, "  {}", (theme.muted)("(none)"));
    } else {
        let _ = writeln!(out, "  {}", plan.params.join(" "));
    }

    out
}
