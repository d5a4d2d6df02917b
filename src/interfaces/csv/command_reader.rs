use crate::application::engine::PaymentSubmission;
use crate::domain::payment::PaymentDetails;
use crate::domain::pool::{Member, PoolId};
use crate::error::{PoolError, Result};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum CommandType {
    Join,
    Mno,
    Card,
    Control,
}

/// One row of the command file.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct CommandRecord {
    pub r#type: CommandType,
    pub pool: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub card_name: Option<String>,
    #[serde(default)]
    pub card_number: Option<String>,
    #[serde(default)]
    pub card_expiry: Option<String>,
    #[serde(default)]
    pub card_cvv: Option<String>,
}

/// What a command row asks the engine to do.
#[derive(Debug, Clone)]
pub enum PoolCommand {
    Join {
        pool: PoolId,
        member: Member,
        quantity: f64,
    },
    Pay(PaymentSubmission),
    /// Generate a control number for the pool and confirm it straight away.
    Control { pool: PoolId, member: Member },
}

impl CommandRecord {
    fn member(&self) -> Member {
        let name = self.name.clone().unwrap_or_default();
        match &self.company {
            Some(company) => Member::new(name).with_company(company.clone()),
            None => Member::new(name),
        }
    }

    pub fn into_command(self) -> Result<PoolCommand> {
        if self.pool.trim().is_empty() {
            return Err(PoolError::ValidationError("missing pool id".to_string()));
        }
        let pool = PoolId::new(self.pool.trim());
        let member = self.member();

        let command = match self.r#type {
            // A missing quantity is not a valid quantity.
            CommandType::Join => PoolCommand::Join {
                pool,
                member,
                quantity: self.quantity.unwrap_or(f64::NAN),
            },
            CommandType::Mno => PoolCommand::Pay(PaymentSubmission {
                pool,
                member,
                quantity: self.quantity,
                details: PaymentDetails::MobileMoney {
                    phone: self.phone.unwrap_or_default(),
                },
            }),
            CommandType::Card => PoolCommand::Pay(PaymentSubmission {
                pool,
                member,
                quantity: self.quantity,
                details: PaymentDetails::Card {
                    holder: self.card_name.unwrap_or_default(),
                    number: self.card_number.unwrap_or_default(),
                    expiry: self.card_expiry.unwrap_or_default(),
                    cvv: self.card_cvv.unwrap_or_default(),
                },
            }),
            CommandType::Control => PoolCommand::Control { pool, member },
        };
        Ok(command)
    }
}

/// Reads pool commands from a CSV source.
///
/// Wraps `csv::Reader` with whitespace trimming and flexible record lengths,
/// so trailing payment columns may be left out.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    /// Creates a new `CommandReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily reads and converts command rows.
    pub fn commands(self) -> impl Iterator<Item = Result<PoolCommand>> {
        self.reader.into_deserialize::<CommandRecord>().map(|result| {
            result
                .map_err(PoolError::from)
                .and_then(CommandRecord::into_command)
        })
    }
}
