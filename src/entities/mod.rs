pub mod admin;
pub mod cost;
pub mod customer;
pub mod discount;
pub mod menu;
pub mod order;
pub mod order_detail;
pub mod order_detail_dump;
pub mod order_dump;
pub mod unit;
pub mod user;
pub mod vendor;
