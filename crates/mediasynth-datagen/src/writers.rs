//! Writer population.

use crate::config::DatasetConfig;
use crate::error::ConfigError;
use crate::gen::Gen;
use crate::generators::{OneOf, Uniform, WeightedChoice};
use crate::model::Writer;
use chrono::NaiveDate;
use rand::{Rng, RngCore};

/// Generate `count` writers.
///
/// IDs are sequential (`writer_001`, `writer_002`, ...). Tenure always starts
/// on the first of a month.
pub fn generate_writers(
    config: &DatasetConfig,
    count: usize,
    rng: &mut dyn RngCore,
) -> Result<Vec<Writer>, ConfigError> {
    let writers = &config.writers;

    let category_gen = OneOf::new("categories", config.categories.clone())?;
    let contract_gen = WeightedChoice::new(
        "writers.contract_types",
        writers
            .contract_types
            .iter()
            .map(|c| (c, c.weight))
            .collect(),
    )?;
    let year_gen = Uniform::new(
        "writers.tenure years",
        writers.tenure_start_year,
        writers.tenure_end_year,
    )?;
    let month_gen = Uniform::new("tenure month", 1u32, 12u32)?;
    let first_name_gen = OneOf::new("writers.first_names", writers.first_names.clone())?;
    let last_name_gen = OneOf::new("writers.last_names", writers.last_names.clone())?;

    (0..count)
        .map(|i| {
            let primary_category = category_gen.generate(rng);
            let contract = contract_gen.generate(rng);
            if contract.min_monthly_target > contract.max_monthly_target {
                return Err(ConfigError::range(
                    format!("writers.contract_types.{}", contract.name),
                    contract.min_monthly_target,
                    contract.max_monthly_target,
                ));
            }
            let target_articles_per_month =
                rng.gen_range(contract.min_monthly_target..=contract.max_monthly_target);

            let year = year_gen.generate(rng);
            let month = month_gen.generate(rng);
            let tenure_start_date = NaiveDate::from_ymd_opt(year, month, 1)
                .ok_or_else(|| ConfigError::value("writers.tenure years", year.to_string()))?;

            let writer_name = format!(
                "{} {}",
                first_name_gen.generate(rng),
                last_name_gen.generate(rng)
            );

            Ok(Writer {
                writer_id: format!("writer_{:03}", i + 1),
                writer_name,
                primary_category,
                tenure_start_date,
                contract_type: contract.name.clone(),
                target_articles_per_month,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded_rng;
    use chrono::Datelike;
    use std::collections::HashSet;

    #[test]
    fn test_sequential_zero_padded_ids() {
        let config = DatasetConfig::default();
        let writers = generate_writers(&config, 12, &mut seeded_rng(1)).unwrap();

        assert_eq!(writers.len(), 12);
        assert_eq!(writers[0].writer_id, "writer_001");
        assert_eq!(writers[11].writer_id, "writer_012");

        let ids: HashSet<_> = writers.iter().map(|w| &w.writer_id).collect();
        assert_eq!(ids.len(), 12);
    }

    #[test]
    fn test_monthly_target_depends_on_contract() {
        let config = DatasetConfig::default();
        let writers = generate_writers(&config, 2000, &mut seeded_rng(2)).unwrap();

        for writer in &writers {
            let target = writer.target_articles_per_month;
            match writer.contract_type.as_str() {
                "staff" => assert!((15..=50).contains(&target), "staff target {}", target),
                "freelance" | "contractor" => {
                    assert!((5..=20).contains(&target), "target {}", target)
                }
                other => panic!("unexpected contract type {}", other),
            }
        }

        let staff = writers.iter().filter(|w| w.contract_type == "staff").count();
        let share = staff as f64 / writers.len() as f64;
        assert!((share - 0.5).abs() < 0.05, "staff share {}", share);
    }

    #[test]
    fn test_tenure_starts_first_of_month_in_window() {
        let config = DatasetConfig::default();
        let writers = generate_writers(&config, 500, &mut seeded_rng(3)).unwrap();

        for writer in &writers {
            let date = writer.tenure_start_date;
            assert_eq!(date.day(), 1);
            assert!((2020..=2024).contains(&date.year()));
            assert!(config.categories.contains(&writer.primary_category));
            assert!(writer.writer_name.contains(' '));
        }
    }

    #[test]
    fn test_zero_writers() {
        let config = DatasetConfig::default();
        let writers = generate_writers(&config, 0, &mut seeded_rng(4)).unwrap();
        assert!(writers.is_empty());
    }
}
