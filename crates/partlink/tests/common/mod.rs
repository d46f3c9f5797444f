#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use partlink::Config;

pub const SHOWER_CSV: &str = "\
Model,Product Name,Spare part code,Description,Description(Thai),Spare parts quantity,Waranty
X70,Rain Shower,P1,Valve core,วาล์ว,2,1 year
,,P2,Hose,สายยาง,1,
,,,,,,
";

pub const TOILET_CSV: &str = "\
Model,Product Name,Spare part code,Description
TS3,Smart Toilet,T1,Seat cover
TS3,Smart Toilet,P1,Shared code
";

pub const RECOMMENDATIONS_CSV: &str = "\
Model,Spare part number,Product name,Spare part name,Recommended Quantity,Remark
X70,P1,淋浴,阀芯,3,keep stock
X70,P1,ignored,ignored,9,
";

/// Lay out a directory of per-category csv sheets plus a recommendation csv.
pub fn write_fixture(root: &Path) -> Config {
  let primary = root.join("parts");
  fs::create_dir_all(&primary).unwrap();
  fs::write(primary.join("Shower.csv"), SHOWER_CSV).unwrap();
  fs::write(primary.join("Toilet.csv"), TOILET_CSV).unwrap();

  let recommendations = root.join("recommendations.csv");
  fs::write(&recommendations, RECOMMENDATIONS_CSV).unwrap();

  Config { primary, recommendations, images_dir: root.join("images"), ..Config::default() }
}

pub fn sheet_path(config: &Config, name: &str) -> PathBuf {
  config.primary.join(format!("{name}.csv"))
}
