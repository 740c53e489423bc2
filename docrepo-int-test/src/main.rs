use docrepo::collection::ObjectId;
use docrepo::errors::RepoResult;
use docrepo::filter::field;
use docrepo::repository::{Criteria, Repository};
use docrepo_derive::{Convertible, Entity};
use docrepo_int_test::test_util::{cleanup, create_test_context};

#[derive(Debug, Clone, Convertible, Default, Entity)]
pub struct StressRecord {
    pub id: ObjectId,
    pub first_name: Option<String>,
    pub processed: bool,
    pub last_name: Option<String>,
    pub failed: bool,
}

fn main() -> RepoResult<()> {
    println!("Starting stress test...");
    let ctx = create_test_context()?;

    let count = 100000;
    let repo: Repository<StressRecord> = ctx.repository()?;

    let start = std::time::Instant::now();
    for _ in 0..count {
        let record = StressRecord {
            first_name: Some(uuid::Uuid::new_v4().to_string()),
            last_name: Some(uuid::Uuid::new_v4().to_string()),
            ..Default::default()
        };
        repo.insert(record)?;
    }
    println!("Inserted {} records in {:?}", count, start.elapsed());

    let start = std::time::Instant::now();
    let mut records = repo.query_filter(field("failed").eq(false))?.to_vec()?;
    for record in records.iter_mut() {
        record.processed = true;
    }
    let updated = repo.update_many(&records)?;
    println!("Updated {} records in {:?}", updated, start.elapsed());

    let start = std::time::Instant::now();
    let processed = repo.count(Criteria::where_(|r: &StressRecord| r.processed))?;
    println!("Counted {} processed records in {:?}", processed, start.elapsed());

    cleanup(ctx)
}
