use crate::llm::types::Usage;

struct Pricing {
    input_per_million: f64,
    output_per_million: f64,
}

fn get_pricing(model: &str) -> Option<Pricing> {
    let pricing = match model {
        m if m.starts_with("claude-opus") => Pricing {
            input_per_million: 15.0,
            output_per_million: 75.0,
        },
        m if m.starts_with("claude-sonnet") => Pricing {
            input_per_million: 3.0,
            output_per_million: 15.0,
        },
        m if m.starts_with("claude-3-5-haiku") => Pricing {
            input_per_million: 0.80,
            output_per_million: 4.0,
        },
        "gpt-4o" => Pricing {
            input_per_million: 2.50,
            output_per_million: 10.0,
        },
        "gpt-4o-mini" => Pricing {
            input_per_million: 0.15,
            output_per_million: 0.60,
        },
        _ => return None,
    };
    Some(pricing)
}

/// Estimated cost in USD for one call, or `None` for models without a
/// published price (local ollama models, unrecognized ids).
pub fn estimate_cost(model: &str, usage: &Usage) -> Option<f64> {
    let pricing = get_pricing(model)?;
    let input_cost = (usage.input_tokens as f64 / 1_000_000.0) * pricing.input_per_million;
    let output_cost = (usage.output_tokens as f64 / 1_000_000.0) * pricing.output_per_million;
    Some(input_cost + output_cost)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage(input: u64, output: u64) -> Usage {
        Usage {
            input_tokens: input,
            output_tokens: output,
        }
    }

    #[test]
    fn test_sonnet_cost() {
        let cost = estimate_cost("claude-sonnet-4-20250514", &usage(1000, 500)).unwrap();
        assert!((cost - 0.0105).abs() < 0.0001);
    }

    #[test]
    fn test_gpt4o_mini_cost() {
        let cost = estimate_cost("gpt-4o-mini", &usage(1000, 500)).unwrap();
        assert!((cost - 0.00045).abs() < 0.00001);
    }

    #[test]
    fn test_unknown_model() {
        assert!(estimate_cost("llama3.1", &usage(1000, 500)).is_none());
    }
}
