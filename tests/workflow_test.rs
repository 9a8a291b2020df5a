use campustrack::error::AppError;
use campustrack::workflow::{
    CollegeStatus, ScholarshipStatus, Stage, available_actions, validate_transition,
};
use pretty_assertions::assert_eq;

fn next_statuses<S: Stage>(from: S) -> Vec<S> {
    available_actions(from).iter().map(|a| a.next).collect()
}

#[test]
fn college_adjacency_matches_the_workflow() {
    use CollegeStatus::*;
    assert_eq!(next_statuses(Researching), vec![Planning]);
    assert_eq!(next_statuses(Planning), vec![InProgress]);
    assert_eq!(next_statuses(InProgress), vec![Submitted]);
    assert_eq!(next_statuses(Submitted), vec![Accepted, Waitlisted, Rejected]);
    assert_eq!(next_statuses(Waitlisted), vec![Accepted, Rejected]);
    assert_eq!(next_statuses(Accepted), vec![Enrolled, Declined]);
    assert_eq!(next_statuses(Rejected), vec![]);
    assert_eq!(next_statuses(Enrolled), vec![]);
    assert_eq!(next_statuses(Declined), vec![]);
}

#[test]
fn scholarship_adjacency_matches_the_workflow() {
    use ScholarshipStatus::*;
    assert_eq!(next_statuses(Interested), vec![Planning, NotPursuing]);
    assert_eq!(next_statuses(Planning), vec![InProgress, NotPursuing]);
    assert_eq!(next_statuses(InProgress), vec![Submitted, NotPursuing]);
    assert_eq!(next_statuses(Submitted), vec![Accepted, Rejected]);
    assert_eq!(next_statuses(Accepted), vec![]);
    assert_eq!(next_statuses(Rejected), vec![]);
    assert_eq!(next_statuses(NotPursuing), vec![]);
}

#[test]
fn terminal_statuses_offer_no_actions() {
    let college_terminals: Vec<CollegeStatus> = CollegeStatus::ALL
        .iter()
        .copied()
        .filter(|s| s.is_terminal())
        .collect();
    assert_eq!(
        college_terminals,
        vec![
            CollegeStatus::Rejected,
            CollegeStatus::Enrolled,
            CollegeStatus::Declined
        ]
    );

    let scholarship_terminals: Vec<ScholarshipStatus> = ScholarshipStatus::ALL
        .iter()
        .copied()
        .filter(|s| s.is_terminal())
        .collect();
    assert_eq!(
        scholarship_terminals,
        vec![
            ScholarshipStatus::Accepted,
            ScholarshipStatus::Rejected,
            ScholarshipStatus::NotPursuing
        ]
    );

    for status in college_terminals {
        assert!(available_actions(status).is_empty());
    }
    for status in scholarship_terminals {
        assert!(available_actions(status).is_empty());
    }
}

#[test]
fn every_offered_transition_validates() {
    for &status in CollegeStatus::ALL {
        for action in available_actions(status) {
            validate_transition(status, action.next).expect("offered transition must be legal");
        }
    }
    for &status in ScholarshipStatus::ALL {
        for action in available_actions(status) {
            validate_transition(status, action.next).expect("offered transition must be legal");
        }
    }
}

#[test]
fn college_walk_to_enrollment_is_legal_stepwise() {
    use CollegeStatus::*;
    let walk = [Researching, Planning, InProgress, Submitted, Accepted, Enrolled];
    for pair in walk.windows(2) {
        validate_transition(pair[0], pair[1]).expect("each step of the walk is offered");
    }
}

#[test]
fn enrollment_is_not_offered_from_researching() {
    assert!(
        !next_statuses(CollegeStatus::Researching).contains(&CollegeStatus::Enrolled),
        "enrolled must not be reachable in one step from researching"
    );
    let err = validate_transition(CollegeStatus::Researching, CollegeStatus::Enrolled)
        .expect_err("jump must be rejected");
    assert!(matches!(err, AppError::IllegalTransition(_)));
}

#[test]
fn side_exit_is_available_from_every_open_scholarship_stage() {
    use ScholarshipStatus::*;
    for status in [Interested, Planning, InProgress] {
        assert!(next_statuses(status).contains(&NotPursuing));
    }
    // But not once the application has been submitted.
    assert!(!next_statuses(Submitted).contains(&NotPursuing));
}

#[test]
fn initial_statuses() {
    assert_eq!(CollegeStatus::initial(), CollegeStatus::Researching);
    assert_eq!(ScholarshipStatus::initial(), ScholarshipStatus::Interested);
}

#[test]
fn wire_names_parse_back() {
    for &status in CollegeStatus::ALL {
        assert_eq!(CollegeStatus::parse(status.as_str()), Some(status));
    }
    for &status in ScholarshipStatus::ALL {
        assert_eq!(ScholarshipStatus::parse(status.as_str()), Some(status));
    }
    assert_eq!(CollegeStatus::parse("graduated"), None);
}
