//! The step catalog: prompt templates, schemas and worked examples for the
//! eight transformation steps, plus the upstream FR-extraction prompt.
//!
//! Adding a step is a data change here; the pipeline dispatches purely on
//! this table.

pub mod schema;
pub mod template;

use once_cell::sync::Lazy;
use serde_json::Value;
use template::{escape_braces, escape_json};

/// Steps the pipeline knows how to run, in execution order.
pub const AVAILABLE_STEPS: [u8; 8] = [1, 2, 3, 4, 5, 6, 7, 8];

/// Everything the runner needs to execute one step.
///
/// `system_prompt` and `user_template` carry `{{`/`}}` escapes for embedded
/// JSON; rendering resolves them. `user_template` contains exactly one
/// `{input_key}` placeholder, filled with the serialized step input.
pub struct StepSpec {
    pub number: u8,
    pub name: &'static str,
    pub input_key: &'static str,
    /// Field of the response object holding this step's payload.
    pub output_field: &'static str,
    pub system_prompt: String,
    pub user_template: String,
}

fn system_prompt(role: &str, schema: &Value, example: &str) -> String {
    format!(
        "{role}\n\nUse the following schema and example for formatting your response:\n{}\nUse the following example as a guide:\n{}\n",
        escape_json(schema),
        escape_braces(example)
    )
}

static STEPS: Lazy<Vec<StepSpec>> = Lazy::new(|| {
    vec![
        StepSpec {
            number: 1,
            name: "Atomic blocks",
            input_key: "requirement_text",
            output_field: "atomic_blocks",
            system_prompt: system_prompt(
                "You are a QA analyst. Break down the given functional requirement\n\
                 into the smallest independent, testable units called atomic blocks. Each atomic block must describe\n\
                 exactly one verifiable condition or behavior from the requirement.",
                &schema::STEP1_SCHEMA,
                schema::STEP1_EXAMPLE,
            ),
            user_template: "Break down the following requirement into atomic blocks.\n\
                            Return only valid JSON following the schema and example provided.\n\n\
                            Requirement:\n{requirement_text}\n"
                .to_string(),
        },
        StepSpec {
            number: 2,
            name: "Partitions",
            input_key: "atomic_blocks",
            output_field: "partitions",
            system_prompt: system_prompt(
                "You are a QA analyst creating equivalence partitions for each atomic block.\n\
                 For every atomic block, identify valid and invalid input categories.",
                &schema::STEP2_SCHEMA,
                schema::STEP2_EXAMPLE,
            ),
            user_template: "Using the atomic blocks from Step 1, identify valid and invalid partitions.\n\
                            Return only JSON following the schema and example.\n\n\
                            Atomic Blocks:\n{atomic_blocks}\n"
                .to_string(),
        },
        StepSpec {
            number: 3,
            name: "Boundaries",
            input_key: "partitions",
            output_field: "boundaries",
            system_prompt: system_prompt(
                "You are a QA analyst defining boundary values for numeric or range-based\n\
                 atomic blocks. Identify invalid, boundary, and valid examples for each block.",
                &schema::STEP3_SCHEMA,
                schema::STEP3_EXAMPLE,
            ),
            user_template: "Using the partitions from Step 2, define boundary cases for each applicable atomic block.\n\
                            Return only JSON following the schema and example.\n\n\
                            Partitions:\n{partitions}\n"
                .to_string(),
        },
        StepSpec {
            number: 4,
            name: "Test values",
            input_key: "boundaries",
            output_field: "test_values",
            system_prompt: system_prompt(
                "You are a QA analyst creating concrete test values for each partition and boundary case.\n\
                 Generate realistic example inputs for every category.",
                &schema::STEP4_SCHEMA,
                schema::STEP4_EXAMPLE,
            ),
            user_template: "Using the partitions and boundary cases below, produce test values for each atomic block.\n\
                            Return only JSON following the schema and example.\n\n\
                            Partitions and Boundaries:\n{boundaries}\n"
                .to_string(),
        },
        StepSpec {
            number: 5,
            name: "Unified list",
            input_key: "test_values",
            output_field: "values",
            system_prompt: system_prompt(
                "You are a QA analyst consolidating test data.\n\
                 Flatten all test values from previous steps into a single unified list of inputs.",
                &schema::STEP5_SCHEMA,
                schema::STEP5_EXAMPLE,
            ),
            user_template: "Combine all test values from previous steps into a unified list.\n\
                            Return only JSON following the schema and example.\n\n\
                            Test Values:\n{test_values}\n"
                .to_string(),
        },
        StepSpec {
            number: 6,
            name: "Deduped list",
            input_key: "unified_values",
            output_field: "deduped_values",
            system_prompt: system_prompt(
                "You are a QA analyst cleaning the test data.\n\
                 Remove duplicates while preserving logical diversity of test cases.",
                &schema::STEP6_SCHEMA,
                schema::STEP6_EXAMPLE,
            ),
            user_template: "Remove duplicate test values and output a cleaned list.\n\
                            Return only JSON following the schema and example.\n\n\
                            Unified Test Values:\n{unified_values}\n"
                .to_string(),
        },
        StepSpec {
            number: 7,
            name: "Organized data",
            input_key: "deduped_values",
            output_field: "organized_data",
            system_prompt: system_prompt(
                "You are a QA analyst structuring organized test data to simplify\n\
                 test case generation. Group values by feature, equivalence class, and boundaries.",
                &schema::STEP7_SCHEMA,
                schema::STEP7_EXAMPLE,
            ),
            user_template: "Organize the deduped test values into equivalence classes and boundary groupings.\n\
                            Return only JSON following the schema and example.\n\n\
                            Deduped Test Values:\n{deduped_values}\n"
                .to_string(),
        },
        StepSpec {
            number: 8,
            name: "Test cases",
            input_key: "organized_data",
            output_field: "test_cases",
            system_prompt: system_prompt(
                "You are a QA analyst writing detailed test cases based on the organized data.\n\
                 Each test case must include title, precondition, steps, data, and expected result.",
                &schema::STEP8_SCHEMA,
                schema::STEP8_EXAMPLE,
            ),
            user_template: "Generate detailed test cases using the organized test data.\n\
                            Return only JSON following the schema and example.\n\n\
                            Organized Test Data:\n{organized_data}\n"
                .to_string(),
        },
    ]
});

/// Look up the spec for a step number.
///
/// Panics on an unknown number: the step table is fixed and callers iterate
/// [`AVAILABLE_STEPS`], so anything else is a programming error.
pub fn step_spec(number: u8) -> &'static StepSpec {
    STEPS
        .iter()
        .find(|s| s.number == number)
        .unwrap_or_else(|| panic!("unknown step {}; available steps: 1-8", number))
}

/// System prompt shared by the upstream FR extractor.
pub const EXTRACTED_FR_SYSTEM: &str = "You are a QA assistant.\n\
Your job is to transform functional requirements into QA artifacts step by step.\n\
Never add commentary.";

/// User prompt for extracting FRs from rasterized requirement pages.
pub const EXTRACTED_FR_USER: &str = r#"Extract all Functional Requirements (FRs) visible in this image
and return them in the following JSON format:

{
    "requirements": [
        {
            "id": "FR-1",
            "text": "..."
        }
    ]
}

Extract the FR information and return it strictly as JSON.
Do not include any other text, explanations, or formatting.
"#;
