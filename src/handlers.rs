use actix_web::http::header::ContentType;
use actix_web::{HttpRequest, HttpResponse, get, web};
use log::error;

use crate::db::Database;
use crate::errors::AppError;
use crate::models::Page;
use crate::params::TableParams;
use crate::render::{PageData, PageRenderer};
use crate::tables::{DaoMembers, DaoProposals, Minipools, Nodes, Table};

/// Registers every route; shared by `main` and the handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(pools_rocketpool)
        .route("/pools/rocketpool/data/minipools", web::get().to(table_data::<Minipools>))
        .route("/pools/rocketpool/data/nodes", web::get().to(table_data::<Nodes>))
        .route("/pools/rocketpool/data/dao_proposals", web::get().to(table_data::<DaoProposals>))
        .route("/pools/rocketpool/data/dao_members", web::get().to(table_data::<DaoMembers>));
}

/// Handler for the GET /pools/rocketpool landing page.
///
/// The page itself is a static shell; the tables on it fetch their rows from
/// the data routes below.
#[get("/pools/rocketpool")]
async fn pools_rocketpool(
    req: HttpRequest,
    renderer: web::Data<PageRenderer>,
) -> Result<HttpResponse, AppError> {
    let mut data = PageData::new("pools/rocketpool", "/pools/rocketpool", "Rocketpool");
    data.header_ad = true;

    let html = renderer
        .render(&data)
        .inspect_err(|e| error!("error executing template for {} route: {}", req.uri(), e))?;

    Ok(HttpResponse::Ok().content_type(ContentType::html()).body(html))
}

/// Handler for the GET /pools/rocketpool/data/* table routes.
///
/// Reads one page of `T` for the table widget. The query runs in a blocking
/// thread so SQLite never holds up the server.
async fn table_data<T: Table>(
    req: HttpRequest,
    db: web::Data<Database>,
) -> Result<HttpResponse, AppError> {
    let params = TableParams::<T::Column>::from_query_string(req.query_string())
        .inspect_err(|e| {
            error!("error parsing datatables parameters for {} route: {}", req.uri(), e)
        })?;
    let draw = params.draw;
    let search = params.search.clone();

    let result = web::block(move || -> Result<Page<T::Row>, rusqlite::Error> {
        let conn = db.connect()?;
        T::fetch(&conn, &params)
    })
    .await;

    let page = match result {
        Ok(Ok(page)) => page,
        Ok(Err(e)) => {
            match &search {
                Some(term) => error!(
                    "error getting {} from db (with search: {}): {}",
                    T::NAME,
                    term.as_str(),
                    e
                ),
                None => error!("error getting {} from db: {}", T::NAME, e),
            }
            return Err(e.into());
        }
        Err(e) => {
            error!("Task error for {} route: {}", req.uri(), e);
            return Err(e.into());
        }
    };

    let body = serde_json::to_string(&page.into_response(draw, T::display))
        .inspect_err(|e| error!("error encoding json response for {} route: {}", req.uri(), e))?;

    Ok(HttpResponse::Ok().content_type(ContentType::json()).body(body))
}
