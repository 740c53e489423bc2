use super::{Person, TestEntity};
use docrepo::filter::{field, FilterComposer};
use docrepo::repository::Repository;
use docrepo_int_test::test_util::{cleanup, create_test_context, run_test};

#[derive(Default, Clone)]
struct PersonSearch {
    last_name: Option<String>,
    city: Option<String>,
    min_age: Option<i32>,
}

fn person_composer(search: PersonSearch) -> FilterComposer<Person, PersonSearch> {
    FilterComposer::builder(search)
        .member(|s: &PersonSearch| s.last_name.as_ref().map(|n| field("last_name").eq(n.as_str())))
        .member(|s: &PersonSearch| s.city.as_ref().map(|c| field("city").eq(c.as_str())))
        .member(|s: &PersonSearch| s.min_age.map(|a| field("age").gte(a)))
        .build()
}

fn person(first: &str, last: &str, city: &str, age: i32) -> Person {
    Person {
        first_name: first.to_string(),
        last_name: last.to_string(),
        city: Some(city.to_string()),
        age,
        ..Default::default()
    }
}

fn seed(repo: &Repository<Person>) -> docrepo::errors::RepoResult<()> {
    repo.insert_many(vec![
        person("Ada", "Lovelace", "London", 36),
        person("Charles", "Babbage", "London", 79),
        person("Grace", "Hopper", "New York", 85),
        person("Alan", "Turing", "Wilmslow", 41),
    ])?;
    Ok(())
}

fn first_names(mut people: Vec<Person>) -> Vec<String> {
    people.sort_by(|a, b| a.first_name.cmp(&b.first_name));
    people.into_iter().map(|p| p.first_name).collect()
}

#[test]
fn test_all_of_requires_every_member() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repo: Repository<Person> = ctx.repository()?;
            seed(&repo)?;

            let composer = person_composer(PersonSearch {
                city: Some("London".to_string()),
                min_age: Some(40),
                ..Default::default()
            });
            assert_eq!(composer.predicate_list().len(), 2);

            let found = repo.query_all_of(&composer)?.to_vec()?;
            assert_eq!(first_names(found), vec!["Charles"]);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_any_of_accepts_any_member() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repo: Repository<Person> = ctx.repository()?;
            seed(&repo)?;

            let composer = person_composer(PersonSearch {
                last_name: Some("Turing".to_string()),
                city: Some("New York".to_string()),
                ..Default::default()
            });

            let found = repo.query_any_of(&composer)?.to_vec()?;
            assert_eq!(first_names(found), vec!["Alan", "Grace"]);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_empty_search_matches_all_or_nothing() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repo: Repository<Person> = ctx.repository()?;
            seed(&repo)?;

            let composer = person_composer(PersonSearch::default());
            assert!(composer.predicate_list().is_empty());

            assert_eq!(repo.query_all_of(&composer)?.size(), 4);
            assert_eq!(repo.query_any_of(&composer)?.size(), 0);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_composed_filter_with_raw_query() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repo: Repository<TestEntity> = ctx.repository()?;
            repo.insert_many((1..=10).map(|i| TestEntity::new(&format!("item{}", i), i)).collect())?;

            let composer = FilterComposer::<TestEntity, (i32, i32)>::builder((3, 6))
                .member(|range: &(i32, i32)| Some(field("int_field").gte(range.0)))
                .member(|range: &(i32, i32)| Some(field("int_field").lte(range.1)))
                .build();

            let found = repo.query_filter(composer.and().and(field("name").ne("item4")))?.to_vec()?;
            let mut values = found.into_iter().map(|e| e.int_field).collect::<Vec<_>>();
            values.sort();
            assert_eq!(values, vec![3, 5, 6]);
            assert_eq!(composer.source(), &(3, 6));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}
