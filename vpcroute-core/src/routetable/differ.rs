//! Differ - Compare desired children with observed ones
//!
//! Convergence is additive: only desired routes and associations absent from
//! the observed status are created. Observed entries that are not desired are
//! left in place.

use crate::client::LOCAL_GATEWAY_ID;
use crate::routetable::resource::{Association, AssociationStatus, Route, RouteStatus};

/// Desired routes with no observed route of the same gateway and destination
pub fn missing_routes<'a>(desired: &'a [Route], observed: &[RouteStatus]) -> Vec<&'a Route> {
    desired
        .iter()
        .filter(|route| !observed.iter().any(|ob| route.is_satisfied_by(ob)))
        .collect()
}

/// Desired associations whose subnet is not associated yet
pub fn missing_associations<'a>(
    desired: &'a [Association],
    observed: &[AssociationStatus],
) -> Vec<&'a Association> {
    desired
        .iter()
        .filter(|asc| !observed.iter().any(|ob| ob.subnet_id == asc.subnet_id))
        .collect()
}

/// Observed routes that may be deleted, in observed order
///
/// The local route cannot be removed from a table, so it is never offered for deletion.
pub fn removable_routes(observed: &[RouteStatus]) -> impl Iterator<Item = &RouteStatus> {
    observed
        .iter()
        .filter(|route| route.gateway_id != LOCAL_GATEWAY_ID)
}

/// A table is available once every route is active; a table without routes is available
pub fn all_routes_active(routes: &[RouteStatus]) -> bool {
    routes.iter().all(|route| route.state.is_active())
}
