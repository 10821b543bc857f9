use serde::{Deserialize, Serialize};

use super::{Memo, opt};
use crate::parser::MemoParser;
use crate::types::{Address, Asset, Chain, is_valid_name};

/// Registers or updates a name record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManageNameMemo {
    /// The name.
    pub name: String,
    /// Chain of the alias address.
    pub chain: Chain,
    /// Address the name resolves to on `chain`.
    pub address: Address,
    /// New owner of the record.
    pub owner: Option<Address>,
    /// Asset payouts to the name are converted to.
    pub preferred_asset: Option<Asset>,
    /// Block height the registration expires at.
    pub expiry: Option<i64>,
}

impl ManageNameMemo {
    pub(super) fn fields(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.chain.to_string(),
            self.address.to_string(),
            opt(self.owner.as_ref()),
            opt(self.preferred_asset.as_ref()),
            opt(self.expiry.as_ref()),
        ]
    }
}

pub(crate) fn decode_manage_name(p: &mut MemoParser<'_>) -> Option<Memo> {
    let name = p.get_string(1, true);
    if let Some(name) = name.as_deref().filter(|n| !is_valid_name(n)) {
        p.fail(format!("invalid name '{name}'"));
    }
    let chain = p.get_chain(2, true);
    let address = p.get_address(3, true);
    let owner = p.get_address(4, false);
    let preferred_asset = p.get_asset(5, false);
    let expiry = if p.get(6).is_empty() {
        None
    } else {
        Some(p.get_int(6, false, 0))
    };
    Some(Memo::ManageName(ManageNameMemo {
        name: name?,
        chain: chain?,
        address: address?,
        owner,
        preferred_asset,
        expiry,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_record() {
        let raw = "~:flash:BTC:bc1qflash:thor1owner:BTC.BTC:5000000";
        let memo: Memo = raw.parse().unwrap();
        let Memo::ManageName(name) = &memo else {
            panic!("expected name, got {memo:?}");
        };
        assert_eq!(name.name, "flash");
        assert_eq!(name.expiry, Some(5_000_000));
        assert_eq!(
            memo.asset().map(ToString::to_string).as_deref(),
            Some("BTC.BTC")
        );
        assert_eq!(memo.encode(), raw);
    }

    #[test]
    fn test_minimal_record() {
        let memo: Memo = "n:flash:THOR:thor1alias".parse().unwrap();
        assert_eq!(memo.encode(), "~:flash:THOR:thor1alias");
    }

    #[test]
    fn test_invalid_name_and_missing_fields() {
        let err = "~:bad name!:BTC".parse::<Memo>().unwrap_err();
        let text = err.to_string();
        assert!(text.contains("invalid name 'bad name!'"));
        assert!(text.contains("not enough parameters: got 3 / want 4"));
    }
}
