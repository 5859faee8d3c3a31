pub mod rest_base;

pub mod altegio;
pub mod amocrm;
pub mod bitrix24;
pub mod dikidi;
pub mod easyweek;
pub mod onec;
pub mod yclients;
