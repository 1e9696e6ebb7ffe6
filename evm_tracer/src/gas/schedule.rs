use serde::{Deserialize, Serialize};

pub const G_WARM_ACCESS: u64 = 100;
pub const G_COLD_ACCOUNT_ACCESS: u64 = 2_600;
pub const G_CALL_VALUE: u64 = 9_000;
pub const G_CALL_STIPEND: u64 = 2_300;
pub const G_NEW_ACCOUNT: u64 = 25_000;
pub const G_CREATE: u64 = 32_000;

/// The fees charged upfront by CALL and CREATE family instructions.
///
/// The default schedule is the one of Ethereum mainnet since Berlin
/// (EIP-2929 warm/cold accesses).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GasSchedule {
    pub warm_access: u64,
    pub cold_account_access: u64,
    pub call_value: u64,
    pub call_stipend: u64,
    pub new_account: u64,
    pub create: u64,
}

impl GasSchedule {
    pub const MAINNET: Self = Self {
        warm_access: G_WARM_ACCESS,
        cold_account_access: G_COLD_ACCOUNT_ACCESS,
        call_value: G_CALL_VALUE,
        call_stipend: G_CALL_STIPEND,
        new_account: G_NEW_ACCOUNT,
        create: G_CREATE,
    };

    /// Gas constants of this schedule, by the names the trace columns know
    /// them.
    pub const fn constants(&self) -> [(&'static str, u64); 6] {
        [
            ("GAS_WARMACCESS", self.warm_access),
            ("GAS_COLDACCOUNTACCESS", self.cold_account_access),
            ("GAS_CALLVALUE", self.call_value),
            ("GAS_CALLSTIPEND", self.call_stipend),
            ("GAS_NEWACCOUNT", self.new_account),
            ("GAS_CREATE", self.create),
        ]
    }

    /// Returns the value of a named gas constant, if this schedule defines it.
    pub fn get(&self, name: &str) -> Option<u64> {
        self.constants()
            .into_iter()
            .find_map(|(n, value)| (n == name).then_some(value))
    }

    /// Fee for touching an account, depending on whether it is already in
    /// the access list.
    pub const fn account_access(&self, warm: bool) -> u64 {
        if warm {
            self.warm_access
        } else {
            self.cold_account_access
        }
    }
}

impl Default for GasSchedule {
    fn default() -> Self {
        Self::MAINNET
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mainnet_matches_named_constants() {
        let schedule = GasSchedule::default();
        let expected = [
            ("GAS_WARMACCESS", 100),
            ("GAS_COLDACCOUNTACCESS", 2_600),
            ("GAS_CALLVALUE", 9_000),
            ("GAS_CALLSTIPEND", 2_300),
            ("GAS_NEWACCOUNT", 25_000),
            ("GAS_CREATE", 32_000),
        ];
        for (name, value) in expected {
            assert_eq!(schedule.get(name), Some(value), "{name}");
        }
        assert_eq!(schedule.get("GAS_SSET"), None);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let schedule: GasSchedule = serde_json::from_str(r#"{ "create": 40000 }"#).unwrap();

        assert_eq!(schedule.create, 40_000);
        assert_eq!(schedule.call_stipend, G_CALL_STIPEND);
        assert_eq!(schedule.account_access(true), G_WARM_ACCESS);
        assert_eq!(schedule.account_access(false), G_COLD_ACCOUNT_ACCESS);
    }
}
