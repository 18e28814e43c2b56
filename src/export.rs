//! CSV summary export of an account collection.
//!
//! Passwords are never written; only whether one is set.

use serde::Serialize;
use std::io::Write;

use crate::{Account, AccountType, Result};

#[derive(Debug, Serialize, PartialEq)]
pub struct AccountRow {
    pub id: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub login: String,
    /// Label texts joined with `;`.
    pub labels: String,
    pub has_password: bool,
}

impl From<&Account> for AccountRow {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.clone(),
            account_type: account.account_type,
            login: account.login.clone(),
            labels: account
                .labels
                .iter()
                .map(|l| l.text.as_str())
                .collect::<Vec<_>>()
                .join(";"),
            has_password: account.password.is_some(),
        }
    }
}

/// Writes one row per account, in collection order, with a header row.
pub fn write_csv<'a, W>(writer: W, accounts: impl IntoIterator<Item = &'a Account>) -> Result<()>
where
    W: Write,
{
    let mut wtr = csv::Writer::from_writer(writer);
    let mut written = false;
    for account in accounts {
        wtr.serialize(AccountRow::from(account))?;
        written = true;
    }
    if !written {
        wtr.write_record(["id", "type", "login", "labels", "has_password"])?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}
