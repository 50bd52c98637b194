// Execution plans written by the model
//
// Plans look like:
//
//   <plan>
//     <step_1> orders=fn::list_orders(customer="42") </step_1>
//     <step_2> fn::ship(order=7, express=true) </step_2>
//   </plan>
//
// Only plain `fn::` steps are executable. Control structures (<for>, <if>)
// are recognized so they can be skipped; their semantics are not defined.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{OrchestrationError, Result};
use crate::message::{ContentBlock, ToolUseBlock};

fn plan_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<plan>(.*?)</plan>").expect("valid plan regex"))
}

fn step_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<step_(\d+)>(.*?)</step_\d+>").expect("valid step regex")
    })
}

fn call_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)^\s*(?:([A-Za-z_][\w]*)\s*=\s*)?fn::\s*([\w.\-]+)\s*\((.*?)\)")
            .expect("valid call regex")
    })
}

/// A tool call parsed from a plan step
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    /// Variable the result is assigned to
    pub variable: Option<String>,
    /// Tool name
    pub name: String,
    /// Parameters in written order
    pub params: Vec<(String, String)>,
    /// Normalized `name(k=v, ...)` text, used to find the position in the plan
    pub signature: String,
}

impl FunctionCall {
    /// Parse `var=fn::Name(k=v, k2=v2)`
    pub fn parse(text: &str) -> Result<Self> {
        let captures = call_regex()
            .captures(text)
            .ok_or_else(|| OrchestrationError::plan(format!("not a function call: {}", text.trim())))?;

        let variable = captures.get(1).map(|m| m.as_str().to_string());
        let name = captures[2].to_string();
        let params = parse_params(&captures[3])?;

        let signature = format!(
            "{}({})",
            name,
            params
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(Self {
            variable,
            name,
            params,
            signature,
        })
    }

    /// Tool-use block for the runtime
    ///
    /// The id is derived from the step position and signature so that routing
    /// the same event twice yields the same payload.
    pub fn to_tool_use(&self, step: usize) -> ContentBlock {
        let seed = format!("{}:{}", step, self.signature);
        let input: Map<String, Value> = self
            .params
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();

        ContentBlock::ToolUse(ToolUseBlock {
            tool_use_id: Uuid::new_v5(&Uuid::NAMESPACE_OID, seed.as_bytes()).to_string(),
            name: self.name.clone(),
            input: Value::Object(input),
        })
    }
}

fn parse_params(raw: &str) -> Result<Vec<(String, String)>> {
    raw.split(',')
        .map(str::trim)
        .filter(|param| !param.is_empty())
        .map(|param| {
            let (key, value) = param
                .split_once('=')
                .ok_or_else(|| OrchestrationError::plan(format!("parameter without value: {}", param)))?;
            Ok((key.trim().to_string(), unquote(value.trim()).to_string()))
        })
        .collect()
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// One step of a plan
#[derive(Debug, Clone, PartialEq)]
pub enum PlanStep {
    /// Executable tool call
    Call(FunctionCall),
    /// `<for>` loop, not executed
    Loop(String),
    /// `<if>` condition, not executed
    Conditional(String),
    /// Anything else (assignments, return statements)
    Statement(String),
}

/// Parsed execution plan
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Plan {
    steps: Vec<PlanStep>,
}

impl Plan {
    /// Parse the first `<plan>` element of `text`
    pub fn parse(text: &str) -> Result<Self> {
        let body = plan_regex()
            .captures(text)
            .and_then(|c| c.get(1))
            .ok_or_else(|| OrchestrationError::plan("no <plan> element in model output"))?
            .as_str();

        let steps = step_regex()
            .captures_iter(body)
            .map(|captures| {
                let step = captures[2].trim();
                if step.contains("<for") {
                    Ok(PlanStep::Loop(step.to_string()))
                } else if step.contains("<if") {
                    Ok(PlanStep::Conditional(step.to_string()))
                } else if step.contains("fn::") {
                    FunctionCall::parse(step).map(PlanStep::Call)
                } else {
                    Ok(PlanStep::Statement(step.to_string()))
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    /// Executable calls with their step index
    pub fn calls(&self) -> impl Iterator<Item = (usize, &FunctionCall)> {
        self.steps
            .iter()
            .enumerate()
            .filter_map(|(index, step)| match step {
                PlanStep::Call(call) => Some((index, call)),
                _ => None,
            })
    }

    /// Steps that were recognized but will not run
    pub fn skipped(&self) -> impl Iterator<Item = &PlanStep> {
        self.steps
            .iter()
            .filter(|step| matches!(step, PlanStep::Loop(_) | PlanStep::Conditional(_)))
    }

    /// The call to run after step `after` (the first call when `after` is None)
    ///
    /// Returns None when no executable step follows.
    pub fn next_call(&self, after: Option<usize>) -> Option<(usize, &FunctionCall)> {
        let mut calls = self.calls();
        match after {
            None => calls.next(),
            Some(last) => calls.find(|(index, _)| *index > last),
        }
    }

    /// Step index of the first call with this signature
    pub fn position_of(&self, signature: &str) -> Option<usize> {
        self.calls()
            .find(|(_, call)| call.signature == signature)
            .map(|(index, _)| index)
    }
}
