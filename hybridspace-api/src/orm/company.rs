use chrono::Utc;
use diesel::prelude::*;

use crate::models::{Company, CompanyUpdate, CompanyWithUsage, NewCompany, PlatformStats};
use crate::models::company::PLANS;

/// Default timezone for companies that don't pick one at registration.
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Seat limit granted by each plan. Superadmins can override per company.
pub fn default_seats(plan: &str) -> i32 {
    match plan {
        "starter" => 20,
        "pro" => 100,
        "enterprise" => 1000,
        _ => 5,
    }
}

/// Whether the given plan name is one we sell.
pub fn is_valid_plan(plan: &str) -> bool {
    PLANS.contains(&plan)
}

/// Insert a new company on the given plan, with the plan's default seat
/// count. Returns the inserted row.
pub fn insert_company(
    conn: &mut SqliteConnection,
    comp_name: String,
    plan: &str,
    timezone: Option<String>,
) -> Result<Company, diesel::result::Error> {
    let new_comp = NewCompany {
        name: comp_name,
        plan: plan.to_string(),
        max_users: default_seats(plan),
        timezone: timezone.unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
        created_at: Utc::now().naive_utc(),
    };

    // Keep the dsl glob in an inner block: its `plan`/`timezone` column unit
    // structs would otherwise turn the same-named parameters into patterns.
    {
        use crate::schema::companies::dsl::*;

        diesel::insert_into(companies)
            .values(&new_comp)
            .execute(conn)?;

        companies.order(id.desc()).first::<Company>(conn)
    }
}

/// Try to find a company by id.
/// Returns Ok(Some(Company)) if found, Ok(None) if not, Err on DB error.
pub fn get_company_by_id(
    conn: &mut SqliteConnection,
    company_id: i32,
) -> Result<Option<Company>, diesel::result::Error> {
    use crate::schema::companies::dsl::*;
    companies
        .filter(id.eq(company_id))
        .first::<Company>(conn)
        .optional()
}

/// Try to find a company by name (case-sensitive).
pub fn get_company_by_name(
    conn: &mut SqliteConnection,
    company_name: &str,
) -> Result<Option<Company>, diesel::result::Error> {
    use crate::schema::companies::dsl::*;
    companies
        .filter(name.eq(company_name))
        .first::<Company>(conn)
        .optional()
}

/// Returns all companies in ascending order by id.
pub fn get_all_companies(
    conn: &mut SqliteConnection,
) -> Result<Vec<Company>, diesel::result::Error> {
    use crate::schema::companies::dsl::*;
    companies.order(id.asc()).load::<Company>(conn)
}

/// Number of active users a company currently has. Deactivated users do
/// not occupy a seat.
pub fn count_active_users(
    conn: &mut SqliteConnection,
    for_company_id: i32,
) -> Result<i64, diesel::result::Error> {
    use crate::schema::users::dsl::*;
    users
        .filter(company_id.eq(for_company_id))
        .filter(active.eq(true))
        .count()
        .get_result(conn)
}

/// All companies with their active-user counts, for the platform dashboard.
pub fn get_companies_with_usage(
    conn: &mut SqliteConnection,
) -> Result<Vec<CompanyWithUsage>, diesel::result::Error> {
    let all = get_all_companies(conn)?;
    let mut out = Vec::with_capacity(all.len());
    for company in all {
        let active_users = count_active_users(conn, company.id)?;
        out.push(CompanyWithUsage {
            id: company.id,
            name: company.name,
            plan: company.plan,
            active: company.active,
            max_users: company.max_users,
            timezone: company.timezone,
            created_at: company.created_at,
            active_users,
        });
    }
    Ok(out)
}

/// Applies a partial update to a company. Fields left `None` keep their
/// current value. Returns the updated row, or NotFound.
pub fn update_company(
    conn: &mut SqliteConnection,
    company_id: i32,
    changes: &CompanyUpdate,
) -> Result<Company, diesel::result::Error> {
    use crate::schema::companies::dsl::*;

    let current = companies.filter(id.eq(company_id)).first::<Company>(conn)?;

    diesel::update(companies.filter(id.eq(company_id)))
        .set((
            name.eq(changes.name.clone().unwrap_or(current.name)),
            plan.eq(changes.plan.clone().unwrap_or(current.plan)),
            active.eq(changes.active.unwrap_or(current.active)),
            max_users.eq(changes.max_users.unwrap_or(current.max_users)),
            timezone.eq(changes.timezone.clone().unwrap_or(current.timezone)),
        ))
        .execute(conn)?;

    companies.filter(id.eq(company_id)).first::<Company>(conn)
}

/// Platform-wide counters: companies, users, and bookings whose date falls
/// in the last 30 days.
pub fn get_platform_stats(
    conn: &mut SqliteConnection,
) -> Result<PlatformStats, diesel::result::Error> {
    use crate::schema::{bookings, companies, users};

    let total_companies: i64 = companies::table.count().get_result(conn)?;
    let total_users: i64 = users::table.count().get_result(conn)?;

    let cutoff = Utc::now().date_naive() - chrono::Duration::days(30);
    let monthly_bookings: i64 = bookings::table
        .filter(bookings::date.gt(cutoff))
        .count()
        .get_result(conn)?;

    Ok(PlatformStats { total_companies, total_users, monthly_bookings })
}
