use greenswap_core::config::{AppConfig, LoadOptions};
use greenswap_core::emissions::EmissionTable;
use greenswap_db::{connect_with_config, migrations, CatalogTable, DbPool, SqlProductStore};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_emission_table(&config));
            checks.extend(check_database(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["emission_table", "database_connectivity", "catalog_readiness"] {
                checks.push(skipped(name, "skipped because configuration did not load"));
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn skipped(name: &'static str, details: &str) -> DoctorCheck {
    DoctorCheck { name, status: CheckStatus::Skipped, details: details.to_string() }
}

fn check_emission_table(config: &AppConfig) -> DoctorCheck {
    match EmissionTable::reference_with_overrides(config.recommend.emission_table_path.as_deref())
    {
        Ok(table) => {
            let categories =
                table.categories().map(|category| category.as_str()).collect::<Vec<_>>();
            DoctorCheck {
                name: "emission_table",
                status: CheckStatus::Pass,
                details: format!("categories: {}", categories.join(", ")),
            }
        }
        Err(error) => DoctorCheck {
            name: "emission_table",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn check_database(config: &AppConfig) -> Vec<DoctorCheck> {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return vec![
                DoctorCheck {
                    name: "database_connectivity",
                    status: CheckStatus::Fail,
                    details: format!("failed to initialize async runtime: {error}"),
                },
                skipped("catalog_readiness", "skipped because the runtime did not start"),
            ];
        }
    };

    runtime.block_on(async {
        let pool = match connect_with_config(&config.database).await {
            Ok(pool) => pool,
            Err(error) => {
                return vec![
                    DoctorCheck {
                        name: "database_connectivity",
                        status: CheckStatus::Fail,
                        details: format!("failed to connect to database: {error}"),
                    },
                    skipped("catalog_readiness", "skipped because the database is unreachable"),
                ];
            }
        };

        let connectivity = DoctorCheck {
            name: "database_connectivity",
            status: CheckStatus::Pass,
            details: format!("connected using `{}`", config.database.url),
        };
        let readiness = check_catalog_readiness(&pool).await;
        pool.close().await;

        vec![connectivity, readiness]
    })
}

async fn check_catalog_readiness(pool: &DbPool) -> DoctorCheck {
    let versions = match migrations::applied_versions(pool).await {
        Ok(versions) => versions,
        Err(error) => {
            return DoctorCheck {
                name: "catalog_readiness",
                status: CheckStatus::Fail,
                details: format!("could not read migration state: {error}"),
            };
        }
    };
    if versions.is_empty() {
        return DoctorCheck {
            name: "catalog_readiness",
            status: CheckStatus::Fail,
            details: "no migrations applied; run `greenswap migrate`".to_string(),
        };
    }

    let store = SqlProductStore::new(pool.clone());
    let mut counts = Vec::new();
    for table in CatalogTable::ALL {
        match store.list(table).await {
            Ok(products) => counts.push((table.name(), products.len())),
            Err(error) => {
                return DoctorCheck {
                    name: "catalog_readiness",
                    status: CheckStatus::Fail,
                    details: format!("could not read `{}`: {error}", table.name()),
                };
            }
        }
    }

    let details =
        counts.iter().map(|(table, rows)| format!("{table}={rows}")).collect::<Vec<_>>().join(", ");
    if counts.iter().any(|(_, rows)| *rows == 0) {
        return DoctorCheck {
            name: "catalog_readiness",
            status: CheckStatus::Fail,
            details: format!("empty catalog tables ({details}); run `greenswap seed` for demo data"),
        };
    }

    DoctorCheck { name: "catalog_readiness", status: CheckStatus::Pass, details }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
