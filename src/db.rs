use crate::entities::{
    Address, AddressType, Alias, AliasType, Business, BusinessComponents, Filing, FilingStatus,
    Office, Party, PartyRole, PartyType, RegistrationBootstrap, ShareClass, ShareSeries,
};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

/// Event for audit trail ("every change is an event")
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Event {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub entity_type: String,
    pub entity_id: String,
    pub data: serde_json::Value,
    pub actor: String,
}

impl Event {
    pub fn new(
        event_type: &str,
        entity_type: &str,
        entity_id: &str,
        data: serde_json::Value,
        actor: &str,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type: event_type.to_string(),
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            data,
            actor: actor.to_string(),
        }
    }
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery (no-op for in-memory databases)
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;

    // ==========================================================================
    // Business aggregate
    // ==========================================================================
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS businesses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            identifier TEXT UNIQUE NOT NULL,
            legal_name TEXT NOT NULL,
            legal_type TEXT NOT NULL,
            founding_date TEXT,
            last_modified TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS offices (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            business_id INTEGER NOT NULL REFERENCES businesses(id),
            office_type TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS parties (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            party_type TEXT NOT NULL,
            first_name TEXT,
            middle_initial TEXT,
            last_name TEXT,
            organization_name TEXT,
            email TEXT
        );

        CREATE TABLE IF NOT EXISTS addresses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            office_id INTEGER REFERENCES offices(id),
            party_id INTEGER REFERENCES parties(id),
            address_type TEXT NOT NULL,
            street_address TEXT NOT NULL,
            street_address_additional TEXT,
            address_city TEXT NOT NULL,
            address_region TEXT,
            address_country TEXT NOT NULL,
            postal_code TEXT NOT NULL,
            delivery_instructions TEXT
        );

        CREATE TABLE IF NOT EXISTS party_roles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            business_id INTEGER NOT NULL REFERENCES businesses(id),
            party_id INTEGER NOT NULL REFERENCES parties(id),
            role TEXT NOT NULL,
            appointment_date TEXT,
            cessation_date TEXT
        );

        CREATE TABLE IF NOT EXISTS share_classes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            business_id INTEGER NOT NULL REFERENCES businesses(id),
            name TEXT NOT NULL,
            priority INTEGER,
            max_share_flag INTEGER NOT NULL,
            max_shares INTEGER,
            par_value_flag INTEGER NOT NULL,
            par_value REAL,
            currency TEXT,
            special_rights_flag INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS share_series (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            share_class_id INTEGER NOT NULL REFERENCES share_classes(id),
            name TEXT NOT NULL,
            priority INTEGER,
            max_share_flag INTEGER NOT NULL,
            max_shares INTEGER,
            special_rights_flag INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS aliases (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            business_id INTEGER NOT NULL REFERENCES businesses(id),
            alias TEXT NOT NULL,
            type TEXT NOT NULL
        );",
    )?;

    // ==========================================================================
    // Filings + bootstraps
    // ==========================================================================
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS filings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            business_id INTEGER REFERENCES businesses(id),
            temp_reg TEXT,
            filing_type TEXT NOT NULL,
            filing_json TEXT NOT NULL,
            filing_date TEXT NOT NULL,
            effective_date TEXT NOT NULL,
            status TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS registration_bootstraps (
            identifier TEXT PRIMARY KEY,
            account TEXT NOT NULL,
            last_modified TEXT NOT NULL
        );",
    )?;

    // ==========================================================================
    // Events Table (audit trail)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id TEXT UNIQUE NOT NULL,
            timestamp TEXT NOT NULL,
            event_type TEXT NOT NULL,
            entity_type TEXT NOT NULL,
            entity_id TEXT NOT NULL,
            data TEXT NOT NULL,
            actor TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_filings_temp_reg ON filings(temp_reg);
         CREATE INDEX IF NOT EXISTS idx_filings_business ON filings(business_id);
         CREATE INDEX IF NOT EXISTS idx_offices_business ON offices(business_id);
         CREATE INDEX IF NOT EXISTS idx_party_roles_business ON party_roles(business_id);
         CREATE INDEX IF NOT EXISTS idx_share_classes_business ON share_classes(business_id);
         CREATE INDEX IF NOT EXISTS idx_events_entity ON events(entity_type, entity_id);
         CREATE INDEX IF NOT EXISTS idx_events_timestamp ON events(timestamp);",
    )?;

    Ok(())
}

// ============================================================================
// ROW HELPERS
// ============================================================================

fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_date(idx: usize, value: Option<String>) -> rusqlite::Result<Option<NaiveDate>> {
    value
        .map(|s| {
            NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
        })
        .transpose()
}

fn parse_json(idx: usize, value: &str) -> rusqlite::Result<serde_json::Value> {
    serde_json::from_str(value)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

// ============================================================================
// REGISTRATION BOOTSTRAPS
// ============================================================================

pub fn insert_bootstrap(conn: &Connection, bootstrap: &RegistrationBootstrap) -> Result<()> {
    conn.execute(
        "INSERT INTO registration_bootstraps (identifier, account, last_modified)
         VALUES (?1, ?2, ?3)",
        params![
            bootstrap.identifier,
            bootstrap.account,
            bootstrap.last_modified.to_rfc3339(),
        ],
    )
    .with_context(|| format!("Failed to insert bootstrap {}", bootstrap.identifier))?;

    Ok(())
}

pub fn find_bootstrap_by_identifier(
    conn: &Connection,
    identifier: &str,
) -> Result<Option<RegistrationBootstrap>> {
    let bootstrap = conn
        .query_row(
            "SELECT identifier, account, last_modified
             FROM registration_bootstraps
             WHERE identifier = ?1",
            [identifier],
            |row| {
                let last_modified: String = row.get(2)?;
                Ok(RegistrationBootstrap {
                    identifier: row.get(0)?,
                    account: row.get(1)?,
                    last_modified: parse_timestamp(2, &last_modified)?,
                })
            },
        )
        .optional()?;

    Ok(bootstrap)
}

pub fn delete_bootstrap(conn: &Connection, identifier: &str) -> Result<()> {
    conn.execute(
        "DELETE FROM registration_bootstraps WHERE identifier = ?1",
        [identifier],
    )?;
    Ok(())
}

// ============================================================================
// FILINGS
// ============================================================================

/// Insert a new filing and return its row id
pub fn insert_filing(conn: &Connection, filing: &Filing) -> Result<i64> {
    let filing_json = serde_json::to_string(filing.filing_json())?;

    conn.execute(
        "INSERT INTO filings (
            business_id, temp_reg, filing_type, filing_json,
            filing_date, effective_date, status
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            filing.business_id,
            filing.temp_reg,
            filing.filing_type,
            filing_json,
            filing.filing_date.to_rfc3339(),
            filing.effective_date.to_rfc3339(),
            filing.status.as_str(),
        ],
    )
    .context("Failed to insert filing")?;

    Ok(conn.last_insert_rowid())
}

const FILING_COLUMNS: &str = "id, business_id, temp_reg, filing_type, filing_json,
                              filing_date, effective_date, status";

fn filing_from_row(row: &rusqlite::Row) -> rusqlite::Result<Filing> {
    let filing_json: String = row.get(4)?;
    let filing_date: String = row.get(5)?;
    let effective_date: String = row.get(6)?;
    let status: String = row.get(7)?;

    let status = FilingStatus::parse(&status).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            7,
            Type::Text,
            format!("unknown filing status {status}").into(),
        )
    })?;

    Ok(Filing::from_row(
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        parse_json(4, &filing_json)?,
        parse_timestamp(5, &filing_date)?,
        parse_timestamp(6, &effective_date)?,
        status,
    ))
}

pub fn find_filing_by_id(conn: &Connection, id: i64) -> Result<Option<Filing>> {
    let filing = conn
        .query_row(
            &format!("SELECT {FILING_COLUMNS} FROM filings WHERE id = ?1"),
            [id],
            filing_from_row,
        )
        .optional()?;

    Ok(filing)
}

pub fn find_filings_by_temp_reg(conn: &Connection, temp_reg: &str) -> Result<Vec<Filing>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {FILING_COLUMNS} FROM filings WHERE temp_reg = ?1 ORDER BY filing_date DESC"
    ))?;

    let filings = stmt
        .query_map([temp_reg], filing_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(filings)
}

pub fn update_filing_status(conn: &Connection, id: i64, status: FilingStatus) -> Result<()> {
    conn.execute(
        "UPDATE filings SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id],
    )?;
    Ok(())
}

// ============================================================================
// BUSINESS AGGREGATE - WRITE
// ============================================================================

fn insert_address(
    conn: &Connection,
    address: &Address,
    office_id: Option<i64>,
    party_id: Option<i64>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO addresses (
            office_id, party_id, address_type, street_address, street_address_additional,
            address_city, address_region, address_country, postal_code, delivery_instructions
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            office_id,
            party_id,
            address.address_type.as_str(),
            address.street_address,
            address.street_address_additional,
            address.address_city,
            address.address_region,
            address.address_country,
            address.postal_code,
            address.delivery_instructions,
        ],
    )?;
    Ok(())
}

fn insert_party(conn: &Connection, party: &Party) -> Result<i64> {
    conn.execute(
        "INSERT INTO parties (
            party_type, first_name, middle_initial, last_name, organization_name, email
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            party.party_type.as_str(),
            party.first_name,
            party.middle_initial,
            party.last_name,
            party.organization_name,
            party.email,
        ],
    )?;
    let party_id = conn.last_insert_rowid();

    for address in party.mailing_address.iter().chain(party.delivery_address.iter()) {
        insert_address(conn, address, None, Some(party_id))?;
    }

    Ok(party_id)
}

fn insert_components(conn: &Connection, business_id: i64, components: &BusinessComponents) -> Result<()> {
    for office in &components.offices {
        conn.execute(
            "INSERT INTO offices (business_id, office_type) VALUES (?1, ?2)",
            params![business_id, office.office_type],
        )?;
        let office_id = conn.last_insert_rowid();
        for address in &office.addresses {
            insert_address(conn, address, Some(office_id), None)?;
        }
    }

    for party_role in &components.party_roles {
        let party_id = insert_party(conn, &party_role.party)?;
        conn.execute(
            "INSERT INTO party_roles (business_id, party_id, role, appointment_date, cessation_date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                business_id,
                party_id,
                party_role.role,
                party_role.appointment_date.map(|d| d.to_string()),
                party_role.cessation_date.map(|d| d.to_string()),
            ],
        )?;
    }

    for share_class in &components.share_classes {
        conn.execute(
            "INSERT INTO share_classes (
                business_id, name, priority, max_share_flag, max_shares,
                par_value_flag, par_value, currency, special_rights_flag
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                business_id,
                share_class.name,
                share_class.priority,
                share_class.max_share_flag,
                share_class.max_shares,
                share_class.par_value_flag,
                share_class.par_value,
                share_class.currency,
                share_class.special_rights_flag,
            ],
        )?;
        let share_class_id = conn.last_insert_rowid();

        for series in &share_class.series {
            conn.execute(
                "INSERT INTO share_series (
                    share_class_id, name, priority, max_share_flag, max_shares, special_rights_flag
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    share_class_id,
                    series.name,
                    series.priority,
                    series.max_share_flag,
                    series.max_shares,
                    series.special_rights_flag,
                ],
            )?;
        }
    }

    for alias in &components.aliases {
        conn.execute(
            "INSERT INTO aliases (business_id, alias, type) VALUES (?1, ?2, ?3)",
            params![business_id, alias.alias, alias.alias_type.as_str()],
        )?;
    }

    Ok(())
}

/// Persist a freshly incorporated business and its finalized filing.
///
/// One SQLite transaction: the business row, every child entity, the filing's
/// new JSON/business link/COMPLETED status and the audit event either all land
/// or none do. Returns the new business row id.
pub fn save_incorporation(conn: &mut Connection, business: &Business, filing: &Filing) -> Result<i64> {
    let tx = conn.transaction()?;

    tx.execute(
        "INSERT INTO businesses (identifier, legal_name, legal_type, founding_date, last_modified)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            business.identifier,
            business.legal_name,
            business.legal_type,
            business.founding_date.map(|dt| dt.to_rfc3339()),
            business.last_modified.to_rfc3339(),
        ],
    )
    .with_context(|| format!("Failed to insert business {}", business.identifier))?;
    let business_id = tx.last_insert_rowid();

    insert_components(&tx, business_id, business.components())
        .with_context(|| format!("Failed to insert components of {}", business.identifier))?;

    let filing_json = serde_json::to_string(filing.filing_json())?;
    let updated = tx.execute(
        "UPDATE filings SET business_id = ?1, filing_json = ?2, status = ?3 WHERE id = ?4",
        params![business_id, filing_json, FilingStatus::Completed.as_str(), filing.id],
    )?;
    if updated != 1 {
        anyhow::bail!("Filing {} not found while saving incorporation", filing.id);
    }

    let event = Event::new(
        "business_incorporated",
        "business",
        &business.identifier,
        serde_json::json!({
            "filing_id": filing.id,
            "legal_type": business.legal_type,
            "offices": business.offices().len(),
            "party_roles": business.party_roles().len(),
            "share_classes": business.share_classes().len(),
        }),
        "entity_filer",
    );
    insert_event(&tx, &event)?;

    tx.commit()?;

    Ok(business_id)
}

// ============================================================================
// BUSINESS AGGREGATE - READ
// ============================================================================

const ADDRESS_COLUMNS: &str = "address_type, street_address, street_address_additional,
                               address_city, address_region, address_country,
                               postal_code, delivery_instructions";

fn address_from_row(row: &rusqlite::Row) -> rusqlite::Result<Address> {
    let address_type: String = row.get(0)?;
    Ok(Address {
        address_type: AddressType::from_key(&address_type).unwrap_or_default(),
        street_address: row.get(1)?,
        street_address_additional: row.get(2)?,
        address_city: row.get(3)?,
        address_region: row.get(4)?,
        address_country: row.get(5)?,
        postal_code: row.get(6)?,
        delivery_instructions: row.get(7)?,
    })
}

fn load_addresses(conn: &Connection, owner_column: &str, owner_id: i64) -> Result<Vec<Address>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE {owner_column} = ?1 ORDER BY id"
    ))?;
    let addresses = stmt
        .query_map([owner_id], address_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(addresses)
}

fn load_offices(conn: &Connection, business_id: i64) -> Result<Vec<Office>> {
    let mut stmt = conn.prepare("SELECT id, office_type FROM offices WHERE business_id = ?1 ORDER BY id")?;
    let rows = stmt
        .query_map([business_id], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(office_id, office_type)| {
            Ok(Office {
                office_type,
                addresses: load_addresses(conn, "office_id", office_id)?,
            })
        })
        .collect()
}

fn load_party_roles(conn: &Connection, business_id: i64) -> Result<Vec<PartyRole>> {
    let mut stmt = conn.prepare(
        "SELECT pr.role, pr.appointment_date, pr.cessation_date, p.id, p.party_type,
                p.first_name, p.middle_initial, p.last_name, p.organization_name, p.email
         FROM party_roles pr
         JOIN parties p ON p.id = pr.party_id
         WHERE pr.business_id = ?1
         ORDER BY pr.id",
    )?;

    let rows = stmt
        .query_map([business_id], |row| {
            let party_type: String = row.get(4)?;
            let role = PartyRole {
                role: row.get(0)?,
                appointment_date: parse_date(1, row.get(1)?)?,
                cessation_date: parse_date(2, row.get(2)?)?,
                party: Party {
                    party_type: PartyType::parse(&party_type),
                    first_name: row.get(5)?,
                    middle_initial: row.get(6)?,
                    last_name: row.get(7)?,
                    organization_name: row.get(8)?,
                    email: row.get(9)?,
                    mailing_address: None,
                    delivery_address: None,
                },
            };
            Ok((row.get::<_, i64>(3)?, role))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(party_id, mut role)| {
            for address in load_addresses(conn, "party_id", party_id)? {
                match address.address_type {
                    AddressType::Mailing => role.party.mailing_address = Some(address),
                    AddressType::Delivery => role.party.delivery_address = Some(address),
                }
            }
            Ok(role)
        })
        .collect()
}

fn load_share_classes(conn: &Connection, business_id: i64) -> Result<Vec<ShareClass>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, priority, max_share_flag, max_shares, par_value_flag,
                par_value, currency, special_rights_flag
         FROM share_classes WHERE business_id = ?1 ORDER BY id",
    )?;
    let rows = stmt
        .query_map([business_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                ShareClass {
                    name: row.get(1)?,
                    priority: row.get(2)?,
                    max_share_flag: row.get(3)?,
                    max_shares: row.get(4)?,
                    par_value_flag: row.get(5)?,
                    par_value: row.get(6)?,
                    currency: row.get(7)?,
                    special_rights_flag: row.get(8)?,
                    series: Vec::new(),
                },
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut series_stmt = conn.prepare(
        "SELECT name, priority, max_share_flag, max_shares, special_rights_flag
         FROM share_series WHERE share_class_id = ?1 ORDER BY id",
    )?;

    rows.into_iter()
        .map(|(share_class_id, mut share_class)| {
            share_class.series = series_stmt
                .query_map([share_class_id], |row| {
                    Ok(ShareSeries {
                        name: row.get(0)?,
                        priority: row.get(1)?,
                        max_share_flag: row.get(2)?,
                        max_shares: row.get(3)?,
                        special_rights_flag: row.get(4)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(share_class)
        })
        .collect()
}

fn load_aliases(conn: &Connection, business_id: i64) -> Result<Vec<Alias>> {
    let mut stmt = conn.prepare("SELECT alias, type FROM aliases WHERE business_id = ?1 ORDER BY id")?;
    let aliases = stmt
        .query_map([business_id], |row| {
            let alias_type: String = row.get(1)?;
            Ok(Alias {
                alias: row.get(0)?,
                alias_type: AliasType::parse(&alias_type).unwrap_or_default(),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(aliases)
}

fn find_business_where(conn: &Connection, clause: &str, value: &dyn rusqlite::ToSql) -> Result<Option<Business>> {
    let row = conn
        .query_row(
            &format!(
                "SELECT id, identifier, legal_name, legal_type, founding_date, last_modified
                 FROM businesses WHERE {clause} = ?1"
            ),
            [value],
            |row| {
                let founding_date: Option<String> = row.get(4)?;
                let last_modified: String = row.get(5)?;

                let mut business = Business::new();
                business.id = Some(row.get(0)?);
                business.identifier = row.get(1)?;
                business.legal_name = row.get(2)?;
                business.legal_type = row.get(3)?;
                business.founding_date = founding_date
                    .map(|s| parse_timestamp(4, &s))
                    .transpose()?;
                business.last_modified = parse_timestamp(5, &last_modified)?;
                Ok(business)
            },
        )
        .optional()?;

    let Some(business) = row else {
        return Ok(None);
    };
    let business_id = business.id.unwrap_or_default();

    let components = BusinessComponents {
        offices: load_offices(conn, business_id)?,
        party_roles: load_party_roles(conn, business_id)?,
        share_classes: load_share_classes(conn, business_id)?,
        aliases: load_aliases(conn, business_id)?,
    };

    Ok(Some(business.with_components(components)))
}

/// Load a business with all its children by registry identifier
pub fn find_business_by_identifier(conn: &Connection, identifier: &str) -> Result<Option<Business>> {
    find_business_where(conn, "identifier", &identifier)
}

pub fn find_business_by_id(conn: &Connection, id: i64) -> Result<Option<Business>> {
    find_business_where(conn, "id", &id)
}

pub fn count_businesses(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM businesses", [], |row| row.get(0))?;
    Ok(count)
}

// ============================================================================
// AUDIT TRAIL
// ============================================================================

/// Insert event into audit trail
pub fn insert_event(conn: &Connection, event: &Event) -> Result<()> {
    let data_json = serde_json::to_string(&event.data)?;

    conn.execute(
        "INSERT INTO events (
            event_id, timestamp, event_type, entity_type, entity_id, data, actor
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            event.event_id,
            event.timestamp.to_rfc3339(),
            event.event_type,
            event.entity_type,
            event.entity_id,
            data_json,
            event.actor,
        ],
    )?;

    Ok(())
}

/// Get events for a specific entity
pub fn get_events_for_entity(
    conn: &Connection,
    entity_type: &str,
    entity_id: &str,
) -> Result<Vec<Event>> {
    let mut stmt = conn.prepare(
        "SELECT event_id, timestamp, event_type, entity_type, entity_id, data, actor
         FROM events
         WHERE entity_type = ?1 AND entity_id = ?2
         ORDER BY timestamp DESC",
    )?;

    let events = stmt
        .query_map(params![entity_type, entity_id], |row| {
            let timestamp_str: String = row.get(1)?;
            let data_json: String = row.get(5)?;

            Ok(Event {
                event_id: row.get(0)?,
                timestamp: parse_timestamp(1, &timestamp_str)?,
                event_type: row.get(2)?,
                entity_type: row.get(3)?,
                entity_id: row.get(4)?,
                data: parse_json(5, &data_json)?,
                actor: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(events)
}
