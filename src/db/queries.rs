use anyhow::Context;
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::booking::{BarbershopContact, Customer, ServiceSummary};
use crate::models::{
    Barbershop, BarbershopService, BarbershopSummary, Booking, BookingDetails, StatusFilter, User,
    DATETIME_FORMAT,
};

fn fmt_ts(ts: &NaiveDateTime) -> String {
    ts.format(DATETIME_FORMAT).to_string()
}

fn parse_ts(s: &str) -> anyhow::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .with_context(|| format!("invalid timestamp in database: {s}"))
}

// ── Users & Sessions ──

pub fn create_user(conn: &Connection, user: &User) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO users (id, name, email, image) VALUES (?1, ?2, ?3, ?4)",
        params![user.id, user.name, user.email, user.image],
    )?;
    Ok(())
}

pub fn create_session(
    conn: &Connection,
    token: &str,
    user_id: &str,
    expires_at: &NaiveDateTime,
) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO sessions (token, user_id, expires_at) VALUES (?1, ?2, ?3)",
        params![token, user_id, fmt_ts(expires_at)],
    )?;
    Ok(())
}

/// User behind an unexpired session token.
pub fn get_session_user(
    conn: &Connection,
    token: &str,
    now: &NaiveDateTime,
) -> anyhow::Result<Option<User>> {
    let user = conn
        .query_row(
            "SELECT u.id, u.name, u.email, u.image
             FROM sessions s JOIN users u ON u.id = s.user_id
             WHERE s.token = ?1 AND s.expires_at > ?2",
            params![token, fmt_ts(now)],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    email: row.get(2)?,
                    image: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(user)
}

// ── Barbershops ──

pub fn create_barbershop(conn: &Connection, shop: &Barbershop) -> anyhow::Result<()> {
    let phones = serde_json::to_string(&shop.phones)?;
    conn.execute(
        "INSERT INTO barbershops (id, name, address, description, image_url, phones, owner_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            shop.id,
            shop.name,
            shop.address,
            shop.description,
            shop.image_url,
            phones,
            shop.owner_id,
        ],
    )?;
    Ok(())
}

const BARBERSHOP_COLUMNS: &str = "id, name, address, description, image_url, phones, owner_id";

fn parse_barbershop_row(row: &rusqlite::Row) -> anyhow::Result<Barbershop> {
    let phones_json: String = row.get(5)?;
    Ok(Barbershop {
        id: row.get(0)?,
        name: row.get(1)?,
        address: row.get(2)?,
        description: row.get(3)?,
        image_url: row.get(4)?,
        phones: serde_json::from_str(&phones_json).context("invalid phones column")?,
        owner_id: row.get(6)?,
    })
}

pub fn get_barbershop(conn: &Connection, id: &str) -> anyhow::Result<Option<Barbershop>> {
    let sql = format!("SELECT {BARBERSHOP_COLUMNS} FROM barbershops WHERE id = ?1");
    let result = conn
        .query_row(&sql, params![id], |row| Ok(parse_barbershop_row(row)))
        .optional()?;
    result.transpose()
}

/// All barbershops by name; `search` narrows to names containing it as a
/// plain substring, ignoring case.
pub fn list_barbershops(conn: &Connection, search: Option<&str>) -> anyhow::Result<Vec<Barbershop>> {
    let sql = format!("SELECT {BARBERSHOP_COLUMNS} FROM barbershops ORDER BY name ASC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| Ok(parse_barbershop_row(row)))?;

    // SQLite's LIKE folds ASCII only and treats % and _ as wildcards
    let needle = search
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    let mut shops = vec![];
    for row in rows {
        let shop = row??;
        let matches = needle
            .as_deref()
            .map_or(true, |n| shop.name.to_lowercase().contains(n));
        if matches {
            shops.push(shop);
        }
    }
    Ok(shops)
}

pub fn get_user_barbershops(
    conn: &Connection,
    owner_id: &str,
) -> anyhow::Result<Vec<BarbershopSummary>> {
    let mut stmt = conn.prepare(
        "SELECT id, name FROM barbershops WHERE owner_id = ?1 ORDER BY name ASC",
    )?;
    let rows = stmt.query_map(params![owner_id], |row| {
        Ok(BarbershopSummary {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;

    let mut shops = vec![];
    for row in rows {
        shops.push(row?);
    }
    Ok(shops)
}

// ── Services ──

pub fn create_service(conn: &Connection, service: &BarbershopService) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO barbershop_services (id, barbershop_id, name, description, image_url, price_in_cents)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            service.id,
            service.barbershop_id,
            service.name,
            service.description,
            service.image_url,
            service.price_in_cents,
        ],
    )?;
    Ok(())
}

fn service_from_row(row: &rusqlite::Row) -> rusqlite::Result<BarbershopService> {
    Ok(BarbershopService {
        id: row.get(0)?,
        barbershop_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        image_url: row.get(4)?,
        price_in_cents: row.get(5)?,
    })
}

pub fn get_service(conn: &Connection, id: &str) -> anyhow::Result<Option<BarbershopService>> {
    let service = conn
        .query_row(
            "SELECT id, barbershop_id, name, description, image_url, price_in_cents
             FROM barbershop_services WHERE id = ?1",
            params![id],
            service_from_row,
        )
        .optional()?;
    Ok(service)
}

pub fn get_barbershop_services(
    conn: &Connection,
    barbershop_id: &str,
) -> anyhow::Result<Vec<BarbershopService>> {
    let mut stmt = conn.prepare(
        "SELECT id, barbershop_id, name, description, image_url, price_in_cents
         FROM barbershop_services WHERE barbershop_id = ?1 ORDER BY name ASC",
    )?;
    let rows = stmt.query_map(params![barbershop_id], service_from_row)?;

    let mut services = vec![];
    for row in rows {
        services.push(row?);
    }
    Ok(services)
}

// ── Bookings ──

pub fn create_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO bookings (id, user_id, service_id, barbershop_id, date, cancelled, cancelled_at, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            booking.id,
            booking.user_id,
            booking.service_id,
            booking.barbershop_id,
            fmt_ts(&booking.date),
            booking.cancelled,
            booking.cancelled_at.as_ref().map(fmt_ts),
            fmt_ts(&booking.created_at),
        ],
    )?;
    Ok(())
}

const BOOKING_COLUMNS: &str =
    "id, user_id, service_id, barbershop_id, date, cancelled, cancelled_at, created_at";

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let date_str: String = row.get(4)?;
    let cancelled_at_str: Option<String> = row.get(6)?;
    let created_at_str: String = row.get(7)?;

    Ok(Booking {
        id: row.get(0)?,
        user_id: row.get(1)?,
        service_id: row.get(2)?,
        barbershop_id: row.get(3)?,
        date: parse_ts(&date_str)?,
        cancelled: row.get(5)?,
        cancelled_at: cancelled_at_str.as_deref().map(parse_ts).transpose()?,
        created_at: parse_ts(&created_at_str)?,
    })
}

pub fn get_booking_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1");
    let result = conn
        .query_row(&sql, params![id], |row| Ok(parse_booking_row(row)))
        .optional()?;
    result.transpose()
}

/// Non-cancelled bookings of one shop with `start <= date <= end`.
pub fn get_active_bookings_in_range(
    conn: &Connection,
    barbershop_id: &str,
    start: &NaiveDateTime,
    end: &NaiveDateTime,
) -> anyhow::Result<Vec<Booking>> {
    let sql = format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings
         WHERE barbershop_id = ?1 AND cancelled = 0 AND date >= ?2 AND date <= ?3
         ORDER BY date ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![barbershop_id, fmt_ts(start), fmt_ts(end)], |row| {
        Ok(parse_booking_row(row))
    })?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn is_slot_taken(
    conn: &Connection,
    barbershop_id: &str,
    date: &NaiveDateTime,
) -> anyhow::Result<bool> {
    let taken: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM bookings WHERE barbershop_id = ?1 AND date = ?2 AND cancelled = 0",
        params![barbershop_id, fmt_ts(date)],
        |row| row.get(0),
    )?;
    Ok(taken)
}

/// Flags the booking cancelled and stamps `cancelled_at` together. Returns
/// false when the booking does not exist or was already cancelled.
pub fn cancel_booking(conn: &Connection, id: &str, now: &NaiveDateTime) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET cancelled = 1, cancelled_at = ?1 WHERE id = ?2 AND cancelled = 0",
        params![fmt_ts(now), id],
    )?;
    Ok(count > 0)
}

/// Filters for the owner booking list. Every constraint that is set applies.
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub status: StatusFilter,
    pub date_from: Option<NaiveDateTime>,
    pub date_to: Option<NaiveDateTime>,
}

const DETAILS_SELECT: &str = "SELECT b.id, b.user_id, b.service_id, b.barbershop_id, b.date, b.cancelled, b.cancelled_at, b.created_at,
        s.name, s.price_in_cents,
        bs.name, bs.address, bs.image_url, bs.phones,
        u.name, u.email, u.image
 FROM bookings b
 JOIN barbershop_services s ON s.id = b.service_id
 JOIN barbershops bs ON bs.id = b.barbershop_id
 JOIN users u ON u.id = b.user_id";

fn parse_details_row(row: &rusqlite::Row) -> anyhow::Result<BookingDetails> {
    let booking = parse_booking_row(row)?;
    let phones_json: String = row.get(13)?;

    Ok(BookingDetails {
        service: ServiceSummary {
            id: booking.service_id.clone(),
            name: row.get(8)?,
            price_in_cents: row.get(9)?,
        },
        barbershop: BarbershopContact {
            id: booking.barbershop_id.clone(),
            name: row.get(10)?,
            address: row.get(11)?,
            image_url: row.get(12)?,
            phones: serde_json::from_str(&phones_json).context("invalid phones column")?,
        },
        customer: Customer {
            id: booking.user_id.clone(),
            name: row.get(14)?,
            email: row.get(15)?,
            image: row.get(16)?,
        },
        booking,
    })
}

pub fn get_user_bookings(conn: &Connection, user_id: &str) -> anyhow::Result<Vec<BookingDetails>> {
    let sql = format!("{DETAILS_SELECT} WHERE b.user_id = ?1 ORDER BY b.date ASC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![user_id], |row| Ok(parse_details_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

/// Bookings of one shop matching `filter`, newest first. `now` splits
/// confirmed from finished.
pub fn get_barbershop_bookings(
    conn: &Connection,
    barbershop_id: &str,
    filter: &BookingFilter,
    now: &NaiveDateTime,
) -> anyhow::Result<Vec<BookingDetails>> {
    let mut conditions = vec!["b.barbershop_id = ?".to_string()];
    let mut values: Vec<String> = vec![barbershop_id.to_string()];

    match filter.status {
        StatusFilter::All => {}
        StatusFilter::Confirmed => {
            conditions.push("b.cancelled = 0".to_string());
            conditions.push("b.date >= ?".to_string());
            values.push(fmt_ts(now));
        }
        StatusFilter::Cancelled => {
            conditions.push("b.cancelled = 1".to_string());
        }
        StatusFilter::Finished => {
            conditions.push("b.cancelled = 0".to_string());
            conditions.push("b.date < ?".to_string());
            values.push(fmt_ts(now));
        }
    }

    if let Some(from) = &filter.date_from {
        conditions.push("b.date >= ?".to_string());
        values.push(fmt_ts(from));
    }
    if let Some(to) = &filter.date_to {
        conditions.push("b.date <= ?".to_string());
        values.push(fmt_ts(to));
    }

    let sql = format!(
        "{DETAILS_SELECT} WHERE {} ORDER BY b.date DESC",
        conditions.join(" AND ")
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(values.iter()), |row| {
        Ok(parse_details_row(row))
    })?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    fn ids(bookings: &[BookingDetails]) -> Vec<&str> {
        bookings.iter().map(|b| b.booking.id.as_str()).collect()
    }

    #[test]
    fn test_session_lookup_respects_expiry() {
        let conn = seeded_db();
        create_session(&conn, "tok", "alice", &dt("2025-06-20 00:00")).unwrap();

        let user = get_session_user(&conn, "tok", &dt("2025-06-16 12:00")).unwrap();
        assert_eq!(user.unwrap().id, "alice");

        assert!(get_session_user(&conn, "tok", &dt("2025-06-21 12:00")).unwrap().is_none());
        assert!(get_session_user(&conn, "nope", &dt("2025-06-16 12:00")).unwrap().is_none());
    }

    #[test]
    fn test_barbershop_roundtrip_and_search() {
        let conn = seeded_db();
        let shop = get_barbershop(&conn, "shop-1").unwrap().unwrap();
        assert_eq!(shop.phones, vec!["(11) 99999-0000".to_string()]);
        assert!(shop.is_owned_by("owner"));

        assert_eq!(list_barbershops(&conn, Some("vintage")).unwrap().len(), 1);
        assert_eq!(list_barbershops(&conn, Some("nothing")).unwrap().len(), 0);
        assert_eq!(list_barbershops(&conn, None).unwrap().len(), 1);
        assert!(get_barbershop(&conn, "missing").unwrap().is_none());
    }

    #[test]
    fn test_search_treats_wildcards_literally() {
        let conn = seeded_db();
        assert!(list_barbershops(&conn, Some("_")).unwrap().is_empty());
        assert!(list_barbershops(&conn, Some("%")).unwrap().is_empty());
        assert!(list_barbershops(&conn, Some("Vintage%")).unwrap().is_empty());
        assert_eq!(list_barbershops(&conn, Some("  ")).unwrap().len(), 1);
    }

    #[test]
    fn test_search_folds_accented_case() {
        let conn = seeded_db();
        for (id, name) in [("shop-sj", "Barbearia São Jorge"), ("shop-eb", "Ébano Cortes")] {
            create_barbershop(
                &conn,
                &Barbershop {
                    id: id.to_string(),
                    name: name.to_string(),
                    address: "Rua Direita, 10".to_string(),
                    description: String::new(),
                    image_url: String::new(),
                    phones: vec![],
                    owner_id: None,
                },
            )
            .unwrap();
        }

        let found = list_barbershops(&conn, Some("SÃO")).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "shop-sj");

        let found = list_barbershops(&conn, Some("ébano")).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "shop-eb");
    }

    #[test]
    fn test_user_barbershops_sorted_by_name() {
        let conn = seeded_db();
        create_barbershop(
            &conn,
            &Barbershop {
                id: "shop-2".to_string(),
                name: "Alpha Cuts".to_string(),
                address: "Av. Paulista, 1".to_string(),
                description: String::new(),
                image_url: String::new(),
                phones: vec![],
                owner_id: Some("owner".to_string()),
            },
        )
        .unwrap();

        let shops = get_user_barbershops(&conn, "owner").unwrap();
        let names: Vec<&str> = shops.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha Cuts", "Vintage Barber"]);
        assert!(get_user_barbershops(&conn, "alice").unwrap().is_empty());
    }

    #[test]
    fn test_active_bookings_in_range_skips_cancelled_and_other_days() {
        let conn = seeded_db();
        insert_booking(&conn, "b1", "alice", "2025-06-16 09:00", false);
        insert_booking(&conn, "b2", "alice", "2025-06-16 10:00", true);
        insert_booking(&conn, "b3", "bob", "2025-06-17 09:00", false);

        let found = get_active_bookings_in_range(
            &conn,
            "shop-1",
            &dt("2025-06-16 00:00"),
            &dt("2025-06-16 23:59"),
        )
        .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "b1");
    }

    #[test]
    fn test_cancel_booking_sets_flag_and_timestamp_once() {
        let conn = seeded_db();
        insert_booking(&conn, "b1", "alice", "2025-06-20 09:00", false);
        assert!(is_slot_taken(&conn, "shop-1", &dt("2025-06-20 09:00")).unwrap());

        assert!(cancel_booking(&conn, "b1", &dt("2025-06-16 12:00")).unwrap());
        let b = get_booking_by_id(&conn, "b1").unwrap().unwrap();
        assert!(b.cancelled);
        assert_eq!(b.cancelled_at, Some(dt("2025-06-16 12:00")));
        assert!(!is_slot_taken(&conn, "shop-1", &dt("2025-06-20 09:00")).unwrap());

        assert!(!cancel_booking(&conn, "b1", &dt("2025-06-16 13:00")).unwrap());
        assert!(!cancel_booking(&conn, "missing", &dt("2025-06-16 13:00")).unwrap());
    }

    #[test]
    fn test_barbershop_bookings_status_filters() {
        let conn = seeded_db();
        let now = dt("2025-06-16 12:00");
        insert_booking(&conn, "past", "alice", "2025-06-10 09:00", false);
        insert_booking(&conn, "future", "alice", "2025-06-20 09:00", false);
        insert_booking(&conn, "at-now", "bob", "2025-06-16 12:00", false);
        insert_booking(&conn, "gone", "bob", "2025-06-21 09:00", true);

        let all = get_barbershop_bookings(&conn, "shop-1", &BookingFilter::default(), &now).unwrap();
        assert_eq!(ids(&all), vec!["gone", "future", "at-now", "past"]);

        let filter = |status| BookingFilter {
            status,
            ..Default::default()
        };
        let confirmed =
            get_barbershop_bookings(&conn, "shop-1", &filter(StatusFilter::Confirmed), &now).unwrap();
        assert_eq!(ids(&confirmed), vec!["future", "at-now"]);

        let cancelled =
            get_barbershop_bookings(&conn, "shop-1", &filter(StatusFilter::Cancelled), &now).unwrap();
        assert_eq!(ids(&cancelled), vec!["gone"]);

        let finished =
            get_barbershop_bookings(&conn, "shop-1", &filter(StatusFilter::Finished), &now).unwrap();
        assert_eq!(ids(&finished), vec!["past"]);
    }

    #[test]
    fn test_barbershop_bookings_date_range_intersects_status() {
        let conn = seeded_db();
        let now = dt("2025-06-16 12:00");
        insert_booking(&conn, "past", "alice", "2025-06-10 09:00", false);
        insert_booking(&conn, "soon", "alice", "2025-06-18 09:00", false);
        insert_booking(&conn, "later", "bob", "2025-06-25 09:00", false);

        let filter = BookingFilter {
            status: StatusFilter::Confirmed,
            date_from: Some(dt("2025-06-01 00:00")),
            date_to: Some(dt("2025-06-20 23:59")),
        };
        let found = get_barbershop_bookings(&conn, "shop-1", &filter, &now).unwrap();
        assert_eq!(ids(&found), vec!["soon"]);

        let filter = BookingFilter {
            status: StatusFilter::All,
            date_from: None,
            date_to: Some(dt("2025-06-18 23:59")),
        };
        let found = get_barbershop_bookings(&conn, "shop-1", &filter, &now).unwrap();
        assert_eq!(ids(&found), vec!["soon", "past"]);
    }

    #[test]
    fn test_details_join_carries_service_shop_and_customer() {
        let conn = seeded_db();
        insert_booking(&conn, "b1", "alice", "2025-06-20 09:00", false);

        let found = get_user_bookings(&conn, "alice").unwrap();
        assert_eq!(found.len(), 1);
        let d = &found[0];
        assert_eq!(d.service.name, "Haircut");
        assert_eq!(d.service.price_in_cents, 5000);
        assert_eq!(d.barbershop.name, "Vintage Barber");
        assert_eq!(d.customer.email, "alice@example.com");
        assert!(get_user_bookings(&conn, "bob").unwrap().is_empty());
    }
}
