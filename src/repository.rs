use crate::domain::{
    application::ValidApplication,
    errors::DatabaseError,
    fields::{ReferralCode, Staff},
    model::{DbApplication, DbStaff},
};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

pub struct StaffSearchQuery {
    pub name: Option<String>,
    pub skip: i64,
    pub limit: i64,
}

pub async fn get_staff_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Staff>, DatabaseError> {
    let staff = sqlx::query_as::<_, DbStaff>("select * from staff where id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            tracing::error!("get staff by id failed >>> {}", e);
            DatabaseError::ServerError
        })?;

    staff.map(Staff::try_from).transpose()
}

/// Exact-match directory lookup by normalized code. `ReferralCode` values are
/// already uppercased and trimmed, so the match is byte-exact.
pub async fn get_staff_by_referral_code(
    pool: &PgPool,
    code: &ReferralCode,
) -> Result<Option<Staff>, DatabaseError> {
    let staff = sqlx::query_as::<_, DbStaff>("select * from staff where referral_code = $1")
        .bind(code.inner())
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            tracing::error!("get staff by referral code failed >>> {}", e);
            DatabaseError::ServerError
        })?;

    staff.map(Staff::try_from).transpose()
}

/// The lexicographically greatest code issued under a prefix, or `None` when
/// the sequence has not started.
pub async fn last_code_for_prefix(
    pool: &PgPool,
    prefix: &str,
) -> Result<Option<String>, DatabaseError> {
    let row = sqlx::query(
        "select max(referral_code) as last_code from staff where referral_code like $1 || '%'",
    )
    .bind(prefix)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        tracing::error!("read last referral code failed >>> {}", e);
        DatabaseError::ServerError
    })?;

    Ok(row.get("last_code"))
}

/// Assigns a candidate code to a staff member who has none yet. The unique
/// index on `staff.referral_code` turns a lost race into
/// `DatabaseError::Conflict`; a row that already holds a code (or vanished)
/// reports the same, since both mean "re-read and reconsider".
pub async fn set_referral_code(
    pool: &PgPool,
    staff_id: Uuid,
    code: &ReferralCode,
) -> Result<(), DatabaseError> {
    let result = sqlx::query(
        "update staff set referral_code = $2 where id = $1 and referral_code is null",
    )
    .bind(staff_id)
    .bind(code.inner())
    .execute(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            tracing::warn!("referral code collision >>> {}", code);
            DatabaseError::Conflict
        } else {
            tracing::error!("assign referral code failed >>> {}", e);
            DatabaseError::ServerError
        }
    })?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::Conflict);
    }

    Ok(())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => db.code().as_deref() == Some("23505"),
        _ => false,
    }
}

pub async fn fetch_staff(
    pool: &PgPool,
    query: StaffSearchQuery,
) -> Result<(Vec<Staff>, i64), DatabaseError> {
    let mut select_query = QueryBuilder::new("select * from staff ");
    let builder = append_search_param_to_query(&mut select_query, &query, false, false);

    let mut count_query = QueryBuilder::new("select count(*) from staff ");
    let count_builder = append_search_param_to_query(&mut count_query, &query, true, true);

    let rows = builder
        .build_query_as::<DbStaff>()
        .fetch_all(pool)
        .await
        .map_err(|e| {
            tracing::error!("staff directory search failed >>> {}", e);
            DatabaseError::ServerError
        })?;

    let count = count_builder.build().fetch_one(pool).await.map_err(|e| {
        tracing::error!("staff directory count failed >>> {}", e);
        DatabaseError::ServerError
    })?;

    let staff = rows
        .into_iter()
        .map(Staff::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok((staff, count.get("count")))
}

fn append_search_param_to_query<'a>(
    builder: &'a mut QueryBuilder<'a, Postgres>,
    query: &StaffSearchQuery,
    skip_ordering: bool,
    skip_pagination: bool,
) -> &'a mut QueryBuilder<'a, Postgres> {
    if let Some(name) = &query.name {
        builder.push(" where name like ");
        builder.push_bind(format!("%{}%", name));
    }

    if !skip_ordering {
        builder.push(" order by created_on desc ");
    }

    if !skip_pagination {
        builder.push(" limit ");
        builder.push_bind(query.limit);

        builder.push(" offset ");
        builder.push_bind(query.skip);
    }

    builder
}

/// Append-only insert; the funnel never updates or deletes application rows.
pub async fn insert_application(
    pool: &PgPool,
    application: &ValidApplication,
    referrer_id: Option<Uuid>,
) -> Result<DbApplication, DatabaseError> {
    sqlx::query_as::<_, DbApplication>(
        "insert into event_applications \
         (id, parent_name, phone, child_gender, child_age, inquiry, referral_code, referrer_id, privacy_consent, marketing_consent) \
         values ($1, $2, $3, $4, $5, $6, $7, $8, true, $9) \
         returning *",
    )
    .bind(Uuid::new_v4())
    .bind(&application.parent_name)
    .bind(application.phone.inner())
    .bind(application.child_gender.as_str())
    .bind(application.child_age.inner())
    .bind(&application.inquiry)
    .bind(application.referral_code.as_ref().map(|c| c.inner()))
    .bind(referrer_id)
    .bind(application.marketing_consent)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        tracing::error!("insert event application failed >>> {}", e);
        DatabaseError::ServerError
    })
}
