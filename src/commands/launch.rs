//! # launch 命令实现
//!
//! 选项绑定之后的工作流启动流程：
//! 1. 从注册表加载工作流入口点
//! 2. 把每个引擎步骤的机器数、墙钟时间展开为与引擎数等长的列表
//! 3. 校验协议
//! 4. `--show-engines` 时只打印引擎信息
//! 5. 为每个引擎查找已配置的 code，组装输入并记录过程节点
//!
//! ## 依赖关系
//! - 被 `commands/mod.rs` 调用
//! - 使用 `cli/launch.rs` 的选项集、`registry/`、`store/`、`utils/output.rs`

use crate::cli::launch::{eos_options, relax_options, EOS, RELAX};
use crate::context::Context;
use crate::error::{CwfError, Result};
use crate::models::RelaxType;
use crate::options::ResolvedOptions;
use crate::registry::{load_workflow, WorkflowEntry};
use crate::store::{ProcessNode, ProcessState};
use crate::utils::output;

use clap::ArgMatches;
use colored::Colorize;
use serde_json::{json, Map, Value};

const DEFAULT_NUMBER_MACHINES: u64 = 1;
const DEFAULT_WALLCLOCK_SECONDS: u64 = 3600;

/// 状态方程工作流的过程标签
const EOS_PROCESS_LABEL: &str = "common_workflows.eos";

/// 执行 `launch` 下的子命令
pub fn execute(matches: &ArgMatches, ctx: &Context) -> Result<()> {
    let launched = match matches.subcommand() {
        Some((RELAX, sub)) => {
            let options = relax_options().resolve(sub, ctx)?;
            launch_relax(&options, ctx)?
        }
        Some((EOS, sub)) => {
            let options = eos_options().resolve(sub, ctx)?;
            launch_eos(&options, ctx)?
        }
        _ => {
            return Err(CwfError::Usage(
                "expected a workflow to launch: `relax` or `eos`".to_string(),
            ))
        }
    };

    if let Some(process) = launched {
        report(&process);
    }
    Ok(())
}

/// 两种工作流共用的启动准备结果
struct Prepared {
    entry: WorkflowEntry,
    protocol: String,
    structure: String,
    engines: Map<String, Value>,
}

fn prepare(options: &ResolvedOptions, ctx: &Context) -> Result<Option<Prepared>> {
    let plugin = options
        .text("plugin")
        .ok_or_else(|| CwfError::MissingRequiredOption {
            option: "PLUGIN".to_string(),
        })?;
    let structure = options
        .structure("structure")
        .ok_or_else(|| CwfError::MissingRequiredOption {
            option: "--structure".to_string(),
        })?
        .to_string();

    tracing::debug!(
        plugin,
        structure = %structure,
        origin = ?options.origin("structure"),
        "preparing launch"
    );

    let entry = load_workflow(ctx.registry.as_ref(), plugin)?;
    let steps = entry.engines.len();

    let number_machines = per_engine(
        options.integers("number-machines"),
        DEFAULT_NUMBER_MACHINES,
        steps,
        "--number-machines",
    )?;
    let wallclock_seconds = per_engine(
        options.integers("wallclock-seconds"),
        DEFAULT_WALLCLOCK_SECONDS,
        steps,
        "--wallclock-seconds",
    )?;

    let protocol = options.text("protocol").unwrap_or("fast").to_string();
    if !entry.is_valid_protocol(&protocol) {
        return Err(CwfError::BadParameter {
            param: "--protocol".to_string(),
            message: format!(
                "`{}` is not implemented by the `{}` workflow, choose from: {}",
                protocol,
                plugin,
                entry.protocols.join(", ")
            ),
        });
    }

    if options.flag("show-engines") {
        show_engines(&entry);
        return Ok(None);
    }

    let mut engines = Map::new();
    for (index, engine) in entry.engines.iter().enumerate() {
        let code = ctx
            .store
            .query_codes(&engine.code_plugin)?
            .into_iter()
            .next()
            .ok_or_else(|| {
                CwfError::Usage(format!(
                    "could not find a configured code for the plugin `{}`.",
                    engine.code_plugin
                ))
            })?;
        tracing::debug!(engine = %engine.name, code = %code.label, "selected code");

        engines.insert(
            engine.name.clone(),
            json!({
                "code": code.uuid,
                "code_label": code.label,
                "options": {
                    "resources": { "num_machines": number_machines[index] },
                    "max_wallclock_seconds": wallclock_seconds[index],
                },
            }),
        );
    }

    Ok(Some(Prepared {
        entry,
        protocol,
        structure,
        engines,
    }))
}

/// 未设置时按引擎数填充默认值；长度必须与引擎数一致
fn per_engine(values: Option<Vec<u64>>, default: u64, steps: usize, option: &str) -> Result<Vec<u64>> {
    let values = values.unwrap_or_else(|| vec![default; steps]);
    if values.len() != steps {
        return Err(CwfError::BadParameter {
            param: option.to_string(),
            message: format!(
                "{} value(s) given but the workflow has {} engine step(s)",
                values.len(),
                steps
            ),
        });
    }
    Ok(values)
}

fn show_engines(entry: &WorkflowEntry) {
    output::print_header(&format!("Engines of {}", entry.name));
    for engine in &entry.engines {
        println!("{}", format!("Engine: {}", engine.name).red().bold());
        println!("{} {}", "Required code plugin:".bold(), engine.code_plugin);
        println!("{} {}\n", "Engine description:".bold(), engine.description);
    }
}

fn process_state(options: &ResolvedOptions) -> ProcessState {
    if options.flag("daemon") {
        ProcessState::Waiting
    } else {
        ProcessState::Created
    }
}

pub fn launch_relax(options: &ResolvedOptions, ctx: &Context) -> Result<Option<ProcessNode>> {
    let Some(prepared) = prepare(options, ctx)? else {
        return Ok(None);
    };
    let relax_type = options
        .relax_type("relaxation-type")
        .unwrap_or(RelaxType::Atoms);

    let inputs = json!({
        "structure": prepared.structure,
        "engines": prepared.engines,
        "protocol": prepared.protocol,
        "relaxation_type": relax_type.label(),
        "threshold_forces": options.float("threshold-forces"),
        "threshold_stress": options.float("threshold-stress"),
    });

    let process = ctx
        .store
        .store_process(&prepared.entry.name, inputs, process_state(options))?;
    tracing::info!(pk = process.pk, label = %process.process_label, "launched relax workflow");
    Ok(Some(process))
}

pub fn launch_eos(options: &ResolvedOptions, ctx: &Context) -> Result<Option<ProcessNode>> {
    let Some(prepared) = prepare(options, ctx)? else {
        return Ok(None);
    };

    let mut generator_inputs = json!({
        "calc_engines": prepared.engines,
        "protocol": prepared.protocol,
        "relaxation_type": RelaxType::Atoms.label(),
    });
    if let Some(value) = options.float("threshold-forces") {
        generator_inputs["threshold_forces"] = json!(value);
    }
    if let Some(value) = options.float("threshold-stress") {
        generator_inputs["threshold_stress"] = json!(value);
    }

    let inputs = json!({
        "structure": prepared.structure,
        "generator_inputs": generator_inputs,
        "sub_process_class": prepared.entry.name,
    });

    let process = ctx
        .store
        .store_process(EOS_PROCESS_LABEL, inputs, process_state(options))?;
    tracing::info!(pk = process.pk, "launched equation of state workflow");
    Ok(Some(process))
}

fn report(process: &ProcessNode) {
    match process.state {
        ProcessState::Waiting => output::print_success(&format!(
            "Submitted {}<{}> to the daemon",
            process.process_label, process.pk
        )),
        ProcessState::Created => output::print_success(&format!(
            "Created {}<{}>",
            process.process_label, process.pk
        )),
    }
    output::print_info(&format!("UUID: {}", process.uuid));
}
