#[macro_use]
extern crate rocket;

#[launch]
fn rocket() -> _ {
    away_mission::rocket_initialize()
}
