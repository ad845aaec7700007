use std::{
    env,
    net::{AddrParseError, SocketAddr},
    str::FromStr,
};

use api::state::MAX_HORIZON_MONTHS;
use core_sim::{LoanModel, ReinvestmentPolicy, SimError, SimulationConfig};
use thiserror::Error;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_PROJECTION_OUTPUT_PATH: &str = "artifacts/projection.csv";
const DEFAULT_LEVERAGE_RATIO: f64 = 1.0;

const ENV_ADDR: &str = "LAB_SERVER_ADDR";
const ENV_PROJECTION_OUTPUT: &str = "LAB_PROJECTION_OUTPUT";
const ENV_INITIAL_CAPITAL: &str = "LAB_INITIAL_CAPITAL";
const ENV_LEVERAGE_RATIO: &str = "LAB_LEVERAGE_RATIO";
const ENV_HIGH_YIELD_RATE: &str = "LAB_HIGH_YIELD_RATE_PCT";
const ENV_SECONDARY_RATE: &str = "LAB_SECONDARY_RATE_PCT";
const ENV_BORROW_RATE: &str = "LAB_BORROW_RATE_PCT";
const ENV_HORIZON_MONTHS: &str = "LAB_HORIZON_MONTHS";
const ENV_REINVESTMENT_POLICY: &str = "LAB_REINVESTMENT_POLICY";
const ENV_LOAN_MODEL: &str = "LAB_LOAN_MODEL";

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub projection_output_path: String,
    pub simulation: SimulationConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("LAB_SERVER_ADDR is not a valid socket address: {0}")]
    InvalidListenAddr(#[source] AddrParseError),
    #[error("LAB_PROJECTION_OUTPUT must not be empty or whitespace")]
    InvalidProjectionOutputPath,
    #[error("{key} must be a finite number, got `{value}`")]
    InvalidNumber { key: &'static str, value: String },
    #[error("{key} must be a whole number of months, got `{value}`")]
    InvalidHorizonMonths { key: &'static str, value: String },
    #[error("{key} is {months} months, above the limit of {max} months")]
    HorizonAboveLimit {
        key: &'static str,
        months: u32,
        max: u32,
    },
    #[error("{key} is not recognised: {source}")]
    InvalidChoice {
        key: &'static str,
        #[source]
        source: SimError,
    },
    #[error("{key} contains non-unicode data")]
    NonUnicode { key: &'static str },
    #[error("default projection parameters are invalid: {0}")]
    InvalidSimulation(#[source] SimError),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let listen_addr = match read_env(ENV_ADDR)? {
            Some(value) => value.parse().map_err(ConfigError::InvalidListenAddr)?,
            None => DEFAULT_LISTEN_ADDR
                .parse()
                .map_err(ConfigError::InvalidListenAddr)?,
        };

        let projection_output_path = match read_env(ENV_PROJECTION_OUTPUT)? {
            Some(value) => {
                if value.trim().is_empty() {
                    return Err(ConfigError::InvalidProjectionOutputPath);
                }
                value
            }
            None => DEFAULT_PROJECTION_OUTPUT_PATH.to_owned(),
        };

        let defaults = SimulationConfig::default();
        let initial_capital = parse_number_env(ENV_INITIAL_CAPITAL, defaults.initial_capital)?;
        let leverage_ratio = parse_number_env(ENV_LEVERAGE_RATIO, DEFAULT_LEVERAGE_RATIO)?;

        let horizon_months = match read_env(ENV_HORIZON_MONTHS)? {
            Some(value) => value
                .trim()
                .parse::<u32>()
                .map_err(|_| ConfigError::InvalidHorizonMonths {
                    key: ENV_HORIZON_MONTHS,
                    value,
                })?,
            None => defaults.horizon_months,
        };
        if horizon_months > MAX_HORIZON_MONTHS {
            return Err(ConfigError::HorizonAboveLimit {
                key: ENV_HORIZON_MONTHS,
                months: horizon_months,
                max: MAX_HORIZON_MONTHS,
            });
        }

        let simulation = SimulationConfig {
            initial_capital,
            borrowed_amount: defaults.borrowed_amount,
            high_yield_annual_rate: parse_number_env(
                ENV_HIGH_YIELD_RATE,
                defaults.high_yield_annual_rate,
            )?,
            secondary_annual_rate: parse_number_env(
                ENV_SECONDARY_RATE,
                defaults.secondary_annual_rate,
            )?,
            borrow_annual_rate: parse_number_env(ENV_BORROW_RATE, defaults.borrow_annual_rate)?,
            horizon_months,
            reinvestment_policy: parse_choice_env::<ReinvestmentPolicy>(
                ENV_REINVESTMENT_POLICY,
                defaults.reinvestment_policy,
            )?,
            loan_model: parse_choice_env::<LoanModel>(ENV_LOAN_MODEL, defaults.loan_model)?,
        }
        .with_leverage_ratio(leverage_ratio)
        .map_err(ConfigError::InvalidSimulation)?;

        simulation
            .validate()
            .map_err(|issue| ConfigError::InvalidSimulation(issue.into()))?;

        Ok(Self {
            listen_addr,
            projection_output_path,
            simulation,
        })
    }
}

fn read_env(key: &'static str) -> Result<Option<String>, ConfigError> {
    match env::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(ConfigError::NonUnicode { key }),
    }
}

fn parse_number_env(key: &'static str, default_value: f64) -> Result<f64, ConfigError> {
    let Some(value) = read_env(key)? else {
        return Ok(default_value);
    };
    match value.trim().parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => Ok(parsed),
        _ => Err(ConfigError::InvalidNumber { key, value }),
    }
}

fn parse_choice_env<T>(key: &'static str, default_value: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Into<SimError>,
{
    match read_env(key)? {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|err| ConfigError::InvalidChoice {
                key,
                source: err.into(),
            }),
        None => Ok(default_value),
    }
}

#[cfg(test)]
mod tests {
    use std::{env, sync::Mutex};

    use core_sim::{LoanModel, ReinvestmentPolicy};

    use super::{
        Config, ConfigError, ENV_ADDR, ENV_BORROW_RATE, ENV_HIGH_YIELD_RATE, ENV_HORIZON_MONTHS,
        ENV_INITIAL_CAPITAL, ENV_LEVERAGE_RATIO, ENV_LOAN_MODEL, ENV_PROJECTION_OUTPUT,
        ENV_REINVESTMENT_POLICY, ENV_SECONDARY_RATE,
    };

    static ENV_LOCK: Mutex<()> = Mutex::new(());
    const ALL_KEYS: [&str; 10] = [
        ENV_ADDR,
        ENV_PROJECTION_OUTPUT,
        ENV_INITIAL_CAPITAL,
        ENV_LEVERAGE_RATIO,
        ENV_HIGH_YIELD_RATE,
        ENV_SECONDARY_RATE,
        ENV_BORROW_RATE,
        ENV_HORIZON_MONTHS,
        ENV_REINVESTMENT_POLICY,
        ENV_LOAN_MODEL,
    ];

    struct EnvVarGuard {
        key: &'static str,
        previous: Option<std::ffi::OsString>,
    }

    impl EnvVarGuard {
        fn set(key: &'static str, value: &str) -> Self {
            let previous = env::var_os(key);
            env::set_var(key, value);
            Self { key, previous }
        }

        fn unset(key: &'static str) -> Self {
            let previous = env::var_os(key);
            env::remove_var(key);
            Self { key, previous }
        }

        #[cfg(unix)]
        fn set_os(key: &'static str, value: std::ffi::OsString) -> Self {
            let previous = env::var_os(key);
            env::set_var(key, value);
            Self { key, previous }
        }
    }

    impl Drop for EnvVarGuard {
        fn drop(&mut self) {
            match self.previous.take() {
                Some(value) => env::set_var(self.key, value),
                None => env::remove_var(self.key),
            }
        }
    }

    fn reset_config_env_baseline() -> Vec<EnvVarGuard> {
        ALL_KEYS.into_iter().map(EnvVarGuard::unset).collect()
    }

    #[test]
    fn defaults_reproduce_reference_scenario() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _baseline = reset_config_env_baseline();

        let config = Config::from_env().unwrap();

        assert_eq!(config.listen_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.projection_output_path, "artifacts/projection.csv");
        assert_eq!(config.simulation, core_sim::SimulationConfig::default());
    }

    #[test]
    fn uses_listen_address_override_from_env() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _baseline = reset_config_env_baseline();
        let _guard = EnvVarGuard::set(ENV_ADDR, "127.0.0.1:9090");

        let config = Config::from_env().unwrap();

        assert_eq!(config.listen_addr, "127.0.0.1:9090".parse().unwrap());
    }

    #[test]
    fn returns_error_for_invalid_listen_address_override() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _baseline = reset_config_env_baseline();
        let _guard = EnvVarGuard::set(ENV_ADDR, "not-an-addr");

        let err = Config::from_env().unwrap_err();

        assert!(matches!(err, ConfigError::InvalidListenAddr(_)));
    }

    #[test]
    fn leverage_ratio_scales_borrowed_amount_from_capital() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _baseline = reset_config_env_baseline();
        let _capital = EnvVarGuard::set(ENV_INITIAL_CAPITAL, "250000");
        let _leverage = EnvVarGuard::set(ENV_LEVERAGE_RATIO, "1.5");

        let config = Config::from_env().unwrap();

        assert_eq!(config.simulation.initial_capital, 250_000.0);
        assert_eq!(config.simulation.borrowed_amount, 375_000.0);
    }

    #[test]
    fn uses_rate_horizon_and_policy_overrides() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _baseline = reset_config_env_baseline();
        let _high = EnvVarGuard::set(ENV_HIGH_YIELD_RATE, "15.5");
        let _secondary = EnvVarGuard::set(ENV_SECONDARY_RATE, "11");
        let _borrow = EnvVarGuard::set(ENV_BORROW_RATE, "9.25");
        let _horizon = EnvVarGuard::set(ENV_HORIZON_MONTHS, "84");
        let _policy = EnvVarGuard::set(ENV_REINVESTMENT_POLICY, "deposit-then-compound");
        let _loan = EnvVarGuard::set(ENV_LOAN_MODEL, "simple-interest");

        let simulation = Config::from_env().unwrap().simulation;

        assert_eq!(simulation.high_yield_annual_rate, 15.5);
        assert_eq!(simulation.secondary_annual_rate, 11.0);
        assert_eq!(simulation.borrow_annual_rate, 9.25);
        assert_eq!(simulation.horizon_months, 84);
        assert_eq!(
            simulation.reinvestment_policy,
            ReinvestmentPolicy::DepositThenCompound
        );
        assert_eq!(simulation.loan_model, LoanModel::SimpleInterest);
    }

    #[test]
    fn returns_error_for_non_numeric_rate() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _baseline = reset_config_env_baseline();
        let _guard = EnvVarGuard::set(ENV_BORROW_RATE, "ten");

        let err = Config::from_env().unwrap_err();

        assert!(matches!(
            err,
            ConfigError::InvalidNumber { key, .. } if key == ENV_BORROW_RATE
        ));
    }

    #[test]
    fn returns_error_for_negative_horizon() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _baseline = reset_config_env_baseline();
        let _guard = EnvVarGuard::set(ENV_HORIZON_MONTHS, "-12");

        let err = Config::from_env().unwrap_err();

        assert!(matches!(err, ConfigError::InvalidHorizonMonths { .. }));
    }

    #[test]
    fn returns_error_for_horizon_above_api_limit() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _baseline = reset_config_env_baseline();
        let _guard = EnvVarGuard::set(ENV_HORIZON_MONTHS, "4000000000");

        let err = Config::from_env().unwrap_err();

        assert!(matches!(
            err,
            ConfigError::HorizonAboveLimit { key, months: 4_000_000_000, max: 12_000 }
                if key == ENV_HORIZON_MONTHS
        ));
    }

    #[test]
    fn accepts_horizon_at_api_limit() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _baseline = reset_config_env_baseline();
        let _guard = EnvVarGuard::set(ENV_HORIZON_MONTHS, "12000");

        let config = Config::from_env().unwrap();

        assert_eq!(config.simulation.horizon_months, 12_000);
    }

    #[test]
    fn returns_error_for_rates_that_overflow_over_horizon() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _baseline = reset_config_env_baseline();
        let _secondary = EnvVarGuard::set(ENV_SECONDARY_RATE, "1000");
        let _horizon = EnvVarGuard::set(ENV_HORIZON_MONTHS, "12000");

        let err = Config::from_env().unwrap_err();

        assert!(matches!(err, ConfigError::InvalidSimulation(_)));
    }

    #[test]
    fn returns_error_for_zero_horizon() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _baseline = reset_config_env_baseline();
        let _guard = EnvVarGuard::set(ENV_HORIZON_MONTHS, "0");

        let err = Config::from_env().unwrap_err();

        assert!(matches!(err, ConfigError::InvalidSimulation(_)));
    }

    #[test]
    fn returns_error_for_unknown_policy() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _baseline = reset_config_env_baseline();
        let _guard = EnvVarGuard::set(ENV_REINVESTMENT_POLICY, "yearly");

        let err = Config::from_env().unwrap_err();

        assert!(matches!(
            err,
            ConfigError::InvalidChoice { key, .. } if key == ENV_REINVESTMENT_POLICY
        ));
    }

    #[test]
    fn returns_error_for_negative_leverage_ratio() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _baseline = reset_config_env_baseline();
        let _guard = EnvVarGuard::set(ENV_LEVERAGE_RATIO, "-1");

        let err = Config::from_env().unwrap_err();

        assert!(matches!(err, ConfigError::InvalidSimulation(_)));
    }

    #[test]
    fn returns_error_for_whitespace_projection_output_override() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _baseline = reset_config_env_baseline();
        let _guard = EnvVarGuard::set(ENV_PROJECTION_OUTPUT, "   ");

        let err = Config::from_env().unwrap_err();

        assert!(matches!(err, ConfigError::InvalidProjectionOutputPath));
    }

    #[cfg(unix)]
    #[test]
    fn returns_error_for_non_unicode_env_var() {
        use std::os::unix::ffi::OsStringExt;

        let _lock = ENV_LOCK.lock().unwrap();
        let _baseline = reset_config_env_baseline();
        let _guard = EnvVarGuard::set_os(
            ENV_LOAN_MODEL,
            std::ffi::OsString::from_vec(vec![0x66, 0x6f, 0x80]),
        );

        let err = Config::from_env().unwrap_err();

        assert!(matches!(err, ConfigError::NonUnicode { key } if key == ENV_LOAN_MODEL));
    }
}
